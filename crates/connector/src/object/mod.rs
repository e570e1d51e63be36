//! Category-bearing objects.
//!
//! Widgets embed an [`ObjectCore`] and implement [`Target`]. The core owns the
//! category set, the signal slots and the event-filter chain, and keeps the
//! connector informed as categories come and go. The connector itself only
//! ever holds weak references to objects.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Weak};

use eye_primitives::{Arg, Category, CategorySet, Event, IntoCategories};
use parking_lot::Mutex;

use crate::Connector;
use crate::plumbing::{FilterChain, SignalHub};

/// Strong reference to a live object, as handed to callbacks.
pub type ObjectRef = Arc<dyn Target>;

/// Identity of a tracked object. Never reused within a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Type-erasure helper so trait objects can be downcast to their widget type.
pub trait AsAny: Any + Send + Sync {
	fn as_any(&self) -> &dyn Any;
	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

/// An object participating in category matching.
pub trait Target: AsAny {
	/// Returns the embedded category core.
	fn core(&self) -> &ObjectCore;

	/// Short label used in diagnostics.
	fn label(&self) -> Cow<'_, str> {
		let full = std::any::type_name::<Self>();
		Cow::Borrowed(full.rsplit("::").next().unwrap_or(full))
	}

	/// Parent in the widget tree, if any.
	fn parent(&self) -> Option<ObjectRef> {
		None
	}
}

impl dyn Target {
	/// Returns the concrete widget if it is a `T`.
	pub fn downcast_ref<T: Target>(&self) -> Option<&T> {
		self.as_any().downcast_ref()
	}

	pub fn is<T: Target>(&self) -> bool {
		self.as_any().is::<T>()
	}

	/// Returns true if `ancestor` is this object or one of its parents.
	pub fn is_descendant_of(&self, ancestor: &dyn Target) -> bool {
		let target = ancestor.core().id();
		if self.core().id() == target {
			return true;
		}
		let mut cursor = self.parent();
		while let Some(obj) = cursor {
			if obj.core().id() == target {
				return true;
			}
			cursor = obj.parent();
		}
		false
	}
}

impl fmt::Display for dyn Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.label(), self.core().id())
	}
}

impl fmt::Debug for dyn Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Target")
			.field("label", &self.label())
			.field("id", &self.core().id())
			.field("categories", &self.core().categories())
			.finish()
	}
}

/// Converts a shared object into its concrete widget type.
///
/// Gives the object back unchanged if it is not a `T`.
pub fn downcast<T: Target>(obj: ObjectRef) -> Result<Arc<T>, ObjectRef> {
	if !obj.is::<T>() {
		return Err(obj);
	}
	Ok(AsAny::into_any(obj).downcast::<T>().unwrap_or_else(|_| unreachable!("type checked above")))
}

/// Category mixin embedded in every [`Target`].
///
/// Created by [`Connector::spawn`], which also registers the finished object.
pub struct ObjectCore {
	id: ObjectId,
	connector: Connector,
	this: Weak<dyn Target>,
	categories: Mutex<CategorySet>,
	signals: SignalHub,
	filters: FilterChain,
}

impl ObjectCore {
	pub(crate) fn new(id: ObjectId, connector: Connector, this: Weak<dyn Target>) -> Self {
		Self {
			id,
			connector,
			this,
			categories: Mutex::new(CategorySet::new()),
			signals: SignalHub::default(),
			filters: FilterChain::default(),
		}
	}

	/// Seeds the initial categories while the object is being built.
	///
	/// Listeners see these when the finished object is registered.
	pub fn with_categories(mut self, categories: impl IntoCategories) -> Self {
		self.categories.get_mut().extend(categories.into_categories());
		self
	}

	pub fn id(&self) -> ObjectId {
		self.id
	}

	pub fn connector(&self) -> &Connector {
		&self.connector
	}

	/// Upgrades the back-reference to the owning object.
	///
	/// `None` while the object is still being built or once it is being dropped.
	pub fn this(&self) -> Option<ObjectRef> {
		self.this.upgrade()
	}

	/// Returns a copy of the current categories.
	pub fn categories(&self) -> CategorySet {
		self.categories.lock().clone()
	}

	pub fn has_category(&self, cat: &str) -> bool {
		self.categories.lock().contains(cat)
	}

	/// Adds a category and connects newly matching listeners.
	///
	/// No-op if the category is already present.
	pub fn add_category(&self, cat: impl Into<Category>) {
		let cat = cat.into();
		let inserted = self.categories.lock().insert(cat.clone());
		if !inserted {
			return;
		}
		if let Some(this) = self.this() {
			self.connector.category_added(&this, &cat);
		}
	}

	/// Removes a category and disconnects listeners that no longer match.
	///
	/// No-op if the category is absent.
	pub fn remove_category(&self, cat: &str) {
		let removed = self.categories.lock().remove(cat);
		if !removed {
			return;
		}
		if let Some(this) = self.this() {
			self.connector.category_removed(&this, &Category::from(cat));
		}
	}

	/// Emits a named signal to every subscribed listener.
	pub fn emit(&self, signal: &str, args: &[Arg]) {
		let slots = self.signals.snapshot(signal);
		if slots.is_empty() {
			return;
		}
		let Some(this) = self.this() else {
			return;
		};
		for listener in slots {
			listener.deliver_signal(&this, args);
		}
	}

	/// Sends a raw event through the installed filters.
	///
	/// Returns true if a filter consumed the event; the widget should then
	/// skip its own handling.
	pub fn send_event(&self, event: &Event) -> bool {
		let filters = self.filters.snapshot();
		if filters.is_empty() {
			return false;
		}
		let Some(this) = self.this() else {
			return false;
		};
		for listener in filters {
			if listener.filter_event(&this, event) {
				tracing::trace!(object = %this, listener = %listener, kind = %event.kind(), "event.consumed");
				return true;
			}
		}
		false
	}

	/// Number of listeners subscribed to `signal`.
	pub fn subscriber_count(&self, signal: &str) -> usize {
		self.signals.subscriber_count(signal)
	}

	/// Number of installed event filters.
	pub fn filter_count(&self) -> usize {
		self.filters.len()
	}

	pub(crate) fn signals(&self) -> &SignalHub {
		&self.signals
	}

	pub(crate) fn filters(&self) -> &FilterChain {
		&self.filters
	}
}

impl Drop for ObjectCore {
	fn drop(&mut self) {
		self.connector.forget(self.id);
	}
}

impl fmt::Debug for ObjectCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObjectCore")
			.field("id", &self.id)
			.field("categories", &*self.categories.lock())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
