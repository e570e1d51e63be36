//! The registry core.
//!
//! Tracks the live object set (weakly) and the ordered listener list, and keeps
//! every listener attached to exactly the objects whose categories intersect
//! its own. Listener lists are published as immutable snapshots so dispatch
//! never holds a lock while user callbacks run; callbacks may register
//! listeners, spawn objects or change categories re-entrantly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use eye_primitives::{Category, CategorySet, IntoCategories};
use parking_lot::Mutex;

use crate::error::{ConnectorError, Result};
use crate::listener::{Hook, Listener, ListenerHandle, ListenerId, Origin};
use crate::object::{ObjectCore, ObjectId, ObjectRef, Target};
use crate::options::ConnectorOptions;
use crate::watch::CategoryChange;

/// Process-wide registry connecting listeners to category-bearing objects.
///
/// Cheap to clone; clones share the same registry. Created once at startup
/// and handed to the widgets that need it.
#[derive(Clone)]
pub struct Connector {
	inner: Arc<Inner>,
}

struct Inner {
	/// Live objects keyed by id. Ids are monotonic, so iteration follows creation order.
	objects: Mutex<BTreeMap<ObjectId, Weak<dyn Target>>>,
	/// Listeners in registration order.
	listeners: ArcSwap<Vec<Arc<Listener>>>,
	next_id: AtomicU64,
	options: ConnectorOptions,
}

impl Default for Connector {
	fn default() -> Self {
		Self::new()
	}
}

impl Connector {
	pub fn new() -> Self {
		Self::with_options(ConnectorOptions::default())
	}

	/// Creates a connector applying `options` to every registration.
	pub fn with_options(options: ConnectorOptions) -> Self {
		Self {
			inner: Arc::new(Inner {
				objects: Mutex::new(BTreeMap::new()),
				listeners: ArcSwap::from_pointee(Vec::new()),
				next_id: AtomicU64::new(0),
				options,
			}),
		}
	}

	pub fn options(&self) -> &ConnectorOptions {
		&self.inner.options
	}

	pub(crate) fn next_id(&self) -> u64 {
		self.inner.next_id.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Builds an object around a fresh [`ObjectCore`] and registers it.
	///
	/// Categories seeded with [`ObjectCore::with_categories`] are matched at
	/// registration; later ones go through [`ObjectCore::add_category`].
	pub fn spawn<T: Target>(&self, build: impl FnOnce(ObjectCore) -> T) -> Arc<T> {
		let id = ObjectId(self.next_id());
		let obj = Arc::new_cyclic(|weak: &Weak<T>| {
			let this: Weak<dyn Target> = weak.clone();
			build(ObjectCore::new(id, self.clone(), this))
		});
		let shared: ObjectRef = obj.clone();
		self.add_object(&shared);
		obj
	}

	/// Starts tracking `obj` and connects every listener matching its current categories.
	///
	/// Registering an object twice has no further effect.
	pub fn add_object(&self, obj: &ObjectRef) {
		let id = obj.core().id();
		{
			let mut objects = self.inner.objects.lock();
			if objects.contains_key(&id) {
				tracing::trace!(object = %obj, "connector.object.duplicate");
				return;
			}
			objects.insert(id, Arc::downgrade(obj));
		}
		tracing::trace!(object = %obj, "connector.object.added");

		if obj.core().categories().is_empty() {
			return;
		}
		for listener in self.inner.listeners.load_full().iter() {
			// Re-read each time: an earlier callback may have changed the categories.
			let categories = obj.core().categories();
			if let Some(reason) = listener.categories().first_shared(&categories) {
				self.connect(obj, listener, reason);
			}
		}
	}

	/// Registers a listener and connects it to every live object already matching.
	#[track_caller]
	pub fn add_hook(&self, categories: impl IntoCategories, hook: Hook) -> Result<ListenerHandle> {
		self.register(categories.into_categories(), hook, None, Origin::caller(), true)
	}

	/// Registers `slot` on `signal` of every object matching any of `categories`.
	///
	/// `"connected"` and `"disconnected"` are pseudo-signals fired once when a
	/// match is established or torn down; the slot then receives no payload.
	#[track_caller]
	pub fn add_listener<F>(&self, categories: impl IntoCategories, signal: &str, slot: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef, &[eye_primitives::Arg]) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.register(categories.into_categories(), Hook::from_signal(signal, Arc::new(slot)), None, Origin::caller(), true)
	}

	/// Registers `filter` as an event interceptor on every matching object.
	#[track_caller]
	pub fn add_event_filter_listener<F>(
		&self,
		categories: impl IntoCategories,
		kinds: impl Into<eye_primitives::EventMask>,
		filter: F,
	) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef, &eye_primitives::Event) -> anyhow::Result<bool> + Send + Sync + 'static,
	{
		let hook = Hook::Filter {
			mask: kinds.into(),
			filter: Arc::new(filter),
		};
		self.register(categories.into_categories(), hook, None, Origin::caller(), true)
	}

	pub(crate) fn register(
		&self,
		categories: CategorySet,
		hook: Hook,
		name: Option<Box<str>>,
		origin: Origin,
		enabled: bool,
	) -> Result<ListenerHandle> {
		if categories.is_empty() {
			return Err(ConnectorError::EmptyCategories { origin: origin.to_string() });
		}
		match &hook {
			Hook::Filter { mask, .. } if mask.is_empty() => {
				return Err(ConnectorError::EmptyEventMask { origin: origin.to_string() });
			}
			Hook::Timer { schedule, .. } if schedule.interval().is_zero() => {
				return Err(ConnectorError::ZeroInterval { origin: origin.to_string() });
			}
			_ => {}
		}

		let enabled = enabled && !self.inner.options.starts_disabled(name.as_deref(), &origin);
		let listener = Arc::new(Listener::new(ListenerId(self.next_id()), name, origin, categories, hook, enabled));
		self.add_listener_entry(&listener);
		Ok(ListenerHandle(listener))
	}

	fn add_listener_entry(&self, listener: &Arc<Listener>) {
		self.inner.listeners.rcu(|current| {
			let mut next = Vec::with_capacity(current.len() + 1);
			next.extend(current.iter().cloned());
			next.push(Arc::clone(listener));
			next
		});
		tracing::debug!(
			listener = %listener,
			origin = %listener.origin(),
			categories = %listener.categories(),
			enabled = listener.is_enabled(),
			"connector.listener.added"
		);

		for obj in self.live_objects() {
			let categories = obj.core().categories();
			if let Some(reason) = listener.categories().first_shared(&categories) {
				self.connect(&obj, listener, reason);
			}
		}
	}

	/// Reacts to `cat` having just been added to `obj`, then notifies
	/// category-change watchers.
	///
	/// Listeners that already matched through another category stay as they
	/// are. The categories are re-read before each listener, since callbacks
	/// may add or remove categories on the same object.
	pub fn category_added(&self, obj: &ObjectRef, cat: &Category) {
		tracing::trace!(object = %obj, category = %cat, "connector.category.added");
		let listeners = self.inner.listeners.load_full();
		for listener in listeners.iter() {
			if !listener.categories().contains(cat.as_str()) {
				continue;
			}
			if obj.core().categories().intersects(listener.categories()) {
				self.connect(obj, listener, cat);
			}
		}
		self.notify_category_change(&listeners, obj, cat, CategoryChange::Added);
	}

	/// Reacts to `cat` having just been removed from `obj`, then notifies
	/// category-change watchers.
	///
	/// Listeners still matching through another category stay connected.
	pub fn category_removed(&self, obj: &ObjectRef, cat: &Category) {
		tracing::trace!(object = %obj, category = %cat, "connector.category.removed");
		let listeners = self.inner.listeners.load_full();
		for listener in listeners.iter() {
			if !listener.categories().contains(cat.as_str()) {
				continue;
			}
			if !obj.core().categories().intersects(listener.categories()) {
				self.disconnect(obj, listener, cat);
			}
		}
		self.notify_category_change(&listeners, obj, cat, CategoryChange::Removed);
	}

	/// Returns live objects carrying every category in `categories`, in creation order.
	///
	/// An empty query matches every live object.
	pub fn objects_matching(&self, categories: impl IntoCategories) -> Vec<ObjectRef> {
		let wanted = categories.into_categories();
		self.live_objects()
			.into_iter()
			.filter(|obj| wanted.is_subset(&obj.core().categories()))
			.collect()
	}

	/// Like [`objects_matching`](Self::objects_matching), restricted to `ancestor` and its descendants.
	pub fn objects_matching_under(&self, categories: impl IntoCategories, ancestor: &ObjectRef) -> Vec<ObjectRef> {
		self.objects_matching(categories)
			.into_iter()
			.filter(|obj| obj.is_descendant_of(ancestor.as_ref()))
			.collect()
	}

	/// Returns handles to every registered listener, in registration order.
	pub fn listeners(&self) -> Vec<ListenerHandle> {
		self.inner.listeners.load().iter().cloned().map(ListenerHandle).collect()
	}

	/// Number of objects still alive.
	pub fn live_object_count(&self) -> usize {
		self.inner.objects.lock().values().filter(|w| w.strong_count() > 0).count()
	}

	/// Removes one listener and disconnects it from every object it is attached to.
	///
	/// Returns false if the listener was already gone.
	pub fn unregister(&self, handle: &ListenerHandle) -> bool {
		let id = handle.id();
		self.remove_listeners(|l| l.id() == id) == 1
	}

	/// Removes every listener registered from `origin`, disconnecting each of them.
	///
	/// Used to reload a configuration script without doubling its listeners.
	/// Returns the number of listeners removed.
	pub fn delete_created_by(&self, origin: &str) -> usize {
		self.remove_listeners(|l| l.origin().matches(origin))
	}

	fn remove_listeners(&self, mut doomed: impl FnMut(&Listener) -> bool) -> usize {
		let mut removed = Vec::new();
		self.inner.listeners.rcu(|current| {
			removed.clear();
			let mut kept = Vec::with_capacity(current.len());
			for listener in current.iter() {
				if doomed(listener) {
					removed.push(Arc::clone(listener));
				} else {
					kept.push(Arc::clone(listener));
				}
			}
			kept
		});

		for listener in &removed {
			listener.retire();
		}
		for listener in &removed {
			tracing::debug!(listener = %listener, origin = %listener.origin(), "connector.listener.removed");
			for id in listener.attached_ids() {
				let Some(obj) = self.object(id) else {
					listener.detach(id);
					continue;
				};
				// Fall back to any listener category so the hub and filter chain are cleaned up too.
				let categories = obj.core().categories();
				let reason = listener
					.categories()
					.first_shared(&categories)
					.or_else(|| listener.categories().iter().next());
				match reason {
					Some(reason) => self.disconnect(&obj, listener, reason),
					None => {
						listener.detach(id);
					}
				}
			}
		}
		removed.len()
	}

	/// Looks up a live object by id.
	pub fn object(&self, id: ObjectId) -> Option<ObjectRef> {
		let weak = self.inner.objects.lock().get(&id).cloned();
		weak.and_then(|w| w.upgrade())
	}

	/// Snapshot of the live objects, in creation order.
	fn live_objects(&self) -> Vec<ObjectRef> {
		let weaks: Vec<Weak<dyn Target>> = self.inner.objects.lock().values().cloned().collect();
		weaks.iter().filter_map(Weak::upgrade).collect()
	}

	fn connect(&self, obj: &ObjectRef, listener: &Arc<Listener>, reason: &Category) {
		// A dispatch loop may still hold a snapshot containing an unregistered listener.
		if listener.is_retired() || !listener.attach(obj.core().id()) {
			return;
		}
		tracing::debug!(object = %obj, listener = %listener, origin = %listener.origin(), category = %reason, "connector.connect");
		listener.on_connect(obj);
	}

	fn disconnect(&self, obj: &ObjectRef, listener: &Arc<Listener>, reason: &Category) {
		if !listener.detach(obj.core().id()) {
			return;
		}
		tracing::debug!(object = %obj, listener = %listener, origin = %listener.origin(), category = %reason, "connector.disconnect");
		listener.on_disconnect(obj);
	}

	/// Drops bookkeeping for an object being destroyed.
	pub(crate) fn forget(&self, id: ObjectId) {
		let removed = self.inner.objects.lock().remove(&id);
		if removed.is_none() {
			return;
		}
		for listener in self.inner.listeners.load().iter() {
			listener.detach(id);
		}
		tracing::trace!(object = %id, "connector.object.forgotten");
	}

	pub(crate) fn listener_snapshot(&self) -> Arc<Vec<Arc<Listener>>> {
		self.inner.listeners.load_full()
	}
}

impl fmt::Debug for Connector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connector")
			.field("objects", &self.inner.objects.lock().len())
			.field("listeners", &self.inner.listeners.load().len())
			.finish()
	}
}
