//! Listeners: units of behavior kept attached to every matching object.
//!
//! The label side stays dynamic (categories are plain strings chosen by
//! configuration code) while the attachment mechanism is the closed [`Hook`]
//! union. Every callback runs through [`Listener::guarded`], which honours the
//! enabled flag and turns errors and panics into log records.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, Location};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eye_primitives::{Arg, Category, CategorySet, Event, EventMask};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::object::{ObjectId, ObjectRef};
use crate::timer::Schedule;
use crate::watch::CategoryChange;

/// Pseudo-signal fired once when an object starts matching.
pub const CONNECTED: &str = "connected";
/// Pseudo-signal fired once when an object stops matching.
pub const DISCONNECTED: &str = "disconnected";

/// Callback receiving only the matching object.
pub type SetupFn = Arc<dyn Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync>;
/// Callback receiving the emitting object followed by the signal payload.
pub type SlotFn = Arc<dyn Fn(&ObjectRef, &[Arg]) -> anyhow::Result<()> + Send + Sync>;
/// Callback deciding whether a raw event is consumed.
pub type FilterFn = Arc<dyn Fn(&ObjectRef, &Event) -> anyhow::Result<bool> + Send + Sync>;
/// Callback told about every category added to or removed from any object.
pub type WatchFn = Arc<dyn Fn(&ObjectRef, &Category, CategoryChange) -> anyhow::Result<()> + Send + Sync>;
/// Callback fired by a timer.
pub type TickFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// How a listener attaches to a matching object.
pub enum Hook {
	/// Runs once when an object starts matching. No persistent subscription.
	Setup(SetupFn),
	/// Runs once when an object stops matching.
	Teardown(SetupFn),
	/// Subscribes to a named signal for as long as the match holds.
	Signal { name: Box<str>, slot: SlotFn },
	/// Intercepts raw events of the masked kinds; returning `true` consumes the event.
	Filter { mask: EventMask, filter: FilterFn },
	/// Fires on a schedule driven by the host event loop; never attaches to objects.
	Timer { schedule: Schedule, tick: TickFn },
	/// Observes category changes on every object; never attaches to objects.
	Watch(WatchFn),
}

impl Hook {
	/// Maps a signal name to a hook, honouring the `connected` and
	/// `disconnected` pseudo-signals. Pseudo-signal slots receive an empty payload.
	pub fn from_signal(name: &str, slot: SlotFn) -> Self {
		match name {
			CONNECTED => Self::Setup(Arc::new(move |obj: &ObjectRef| slot(obj, &[]))),
			DISCONNECTED => Self::Teardown(Arc::new(move |obj: &ObjectRef| slot(obj, &[]))),
			_ => Self::Signal { name: name.into(), slot },
		}
	}

	/// Short description used in diagnostics.
	pub fn describe(&self) -> String {
		match self {
			Self::Setup(_) => CONNECTED.to_string(),
			Self::Teardown(_) => DISCONNECTED.to_string(),
			Self::Signal { name, .. } => format!("signal {name}"),
			Self::Filter { mask, .. } => format!("filter {mask:?}"),
			Self::Timer { schedule, .. } => format!("timer {schedule}"),
			Self::Watch(_) => "category watch".to_string(),
		}
	}
}

impl fmt::Debug for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.describe())
	}
}

/// Identifier of a registered listener, unique per connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "listener#{}", self.0)
	}
}

/// Source location a listener was registered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
	file: Box<str>,
	line: u32,
}

impl Origin {
	/// Captures the caller's source location.
	#[track_caller]
	pub fn caller() -> Self {
		Self::from(Location::caller())
	}

	/// Origin naming a file without a line, e.g. a reloadable script.
	pub fn file(path: impl AsRef<str>) -> Self {
		Self {
			file: path.as_ref().into(),
			line: 0,
		}
	}

	pub fn path(&self) -> &str {
		&self.file
	}

	pub fn line(&self) -> Option<u32> {
		(self.line != 0).then_some(self.line)
	}

	/// Returns true if this origin is `path`, or ends with `path` component-wise.
	pub fn matches(&self, path: &str) -> bool {
		*self.file == *path || Path::new(&*self.file).ends_with(path)
	}
}

impl From<&'static Location<'static>> for Origin {
	fn from(loc: &'static Location<'static>) -> Self {
		Self {
			file: loc.file().into(),
			line: loc.line(),
		}
	}
}

impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.line() {
			Some(line) => write!(f, "{}:{line}", self.file),
			None => f.write_str(&self.file),
		}
	}
}

/// A registered listener.
pub(crate) struct Listener {
	id: ListenerId,
	name: Option<Box<str>>,
	origin: Origin,
	categories: CategorySet,
	hook: Hook,
	enabled: AtomicBool,
	/// Set once the listener is unregistered; it never attaches again.
	retired: AtomicBool,
	/// Objects this listener is currently attached to.
	attached: Mutex<FxHashSet<ObjectId>>,
}

impl Listener {
	pub(crate) fn new(id: ListenerId, name: Option<Box<str>>, origin: Origin, categories: CategorySet, hook: Hook, enabled: bool) -> Self {
		Self {
			id,
			name,
			origin,
			categories,
			hook,
			enabled: AtomicBool::new(enabled),
			retired: AtomicBool::new(false),
			attached: Mutex::new(FxHashSet::default()),
		}
	}

	pub(crate) fn id(&self) -> ListenerId {
		self.id
	}

	pub(crate) fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub(crate) fn origin(&self) -> &Origin {
		&self.origin
	}

	pub(crate) fn categories(&self) -> &CategorySet {
		&self.categories
	}

	pub(crate) fn hook(&self) -> &Hook {
		&self.hook
	}

	pub(crate) fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::Acquire)
	}

	pub(crate) fn set_enabled(&self, enabled: bool) {
		self.enabled.store(enabled, Ordering::Release);
	}

	pub(crate) fn retire(&self) {
		self.retired.store(true, Ordering::Release);
	}

	pub(crate) fn is_retired(&self) -> bool {
		self.retired.load(Ordering::Acquire)
	}

	/// Records an attachment, returning `false` if already attached.
	pub(crate) fn attach(&self, obj: ObjectId) -> bool {
		self.attached.lock().insert(obj)
	}

	/// Drops an attachment, returning `false` if it was not attached.
	pub(crate) fn detach(&self, obj: ObjectId) -> bool {
		self.attached.lock().remove(&obj)
	}

	pub(crate) fn is_attached(&self, obj: ObjectId) -> bool {
		self.attached.lock().contains(&obj)
	}

	pub(crate) fn attached_ids(&self) -> Vec<ObjectId> {
		let mut ids: Vec<_> = self.attached.lock().iter().copied().collect();
		ids.sort_unstable();
		ids
	}

	pub(crate) fn attached_count(&self) -> usize {
		self.attached.lock().len()
	}

	/// Attaches to `obj` according to the hook kind.
	pub(crate) fn on_connect(self: &Arc<Self>, obj: &ObjectRef) {
		match &self.hook {
			Hook::Setup(cb) => {
				self.guarded(Some(obj), || cb(obj));
			}
			Hook::Teardown(_) | Hook::Timer { .. } | Hook::Watch(_) => {}
			Hook::Signal { name, .. } => obj.core().signals().connect(name, Arc::clone(self)),
			Hook::Filter { .. } => obj.core().filters().install(Arc::clone(self)),
		}
	}

	/// Detaches from `obj` according to the hook kind.
	pub(crate) fn on_disconnect(&self, obj: &ObjectRef) {
		match &self.hook {
			Hook::Teardown(cb) => {
				self.guarded(Some(obj), || cb(obj));
			}
			Hook::Setup(_) | Hook::Timer { .. } | Hook::Watch(_) => {}
			Hook::Signal { name, .. } => {
				obj.core().signals().disconnect(name, self.id);
			}
			Hook::Filter { .. } => {
				obj.core().filters().remove(self.id);
			}
		}
	}

	/// Delivers a signal emission from `obj`.
	pub(crate) fn deliver_signal(&self, obj: &ObjectRef, args: &[Arg]) {
		if let Hook::Signal { slot, .. } = &self.hook
			&& !self.is_retired()
		{
			self.guarded(Some(obj), || slot(obj, args));
		}
	}

	/// Offers a raw event to the filter. Returns true if the event is consumed.
	pub(crate) fn filter_event(&self, obj: &ObjectRef, event: &Event) -> bool {
		match &self.hook {
			Hook::Filter { mask, filter } if mask.accepts(event.kind()) && !self.is_retired() => self.guarded(Some(obj), || filter(obj, event)).unwrap_or(false),
			_ => false,
		}
	}

	/// Runs the timer callback.
	pub(crate) fn tick(&self) {
		if let Hook::Timer { tick, .. } = &self.hook
			&& !self.is_retired()
		{
			self.guarded(None, || tick());
		}
	}

	/// Reports a category change on `obj`.
	pub(crate) fn watch(&self, obj: &ObjectRef, cat: &Category, change: CategoryChange) {
		if let Hook::Watch(cb) = &self.hook
			&& !self.is_retired()
		{
			self.guarded(Some(obj), || cb(obj, cat, change));
		}
	}

	/// Invokes a callback unless disabled, logging and suppressing failures.
	///
	/// Returns `None` when the listener is disabled or the callback failed.
	pub(crate) fn guarded<R>(&self, obj: Option<&ObjectRef>, f: impl FnOnce() -> anyhow::Result<R>) -> Option<R> {
		if !self.is_enabled() {
			tracing::trace!(listener = %self, "listener.suppressed");
			return None;
		}

		match std::panic::catch_unwind(AssertUnwindSafe(f)) {
			Ok(Ok(value)) => Some(value),
			Ok(Err(error)) => {
				match obj {
					Some(obj) => tracing::error!(listener = %self, origin = %self.origin, object = %obj, error = ?error, "listener.callback_failed"),
					None => tracing::error!(listener = %self, origin = %self.origin, error = ?error, "listener.callback_failed"),
				}
				None
			}
			Err(payload) => {
				let message = panic_message(payload.as_ref());
				match obj {
					Some(obj) => tracing::error!(listener = %self, origin = %self.origin, object = %obj, panic = %message, "listener.callback_panicked"),
					None => tracing::error!(listener = %self, origin = %self.origin, panic = %message, "listener.callback_panicked"),
				}
				None
			}
		}
	}
}

impl fmt::Display for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.name {
			Some(name) => write!(f, "{} `{name}` ({})", self.id, self.hook.describe()),
			None => write!(f, "{} ({})", self.id, self.hook.describe()),
		}
	}
}

impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listener")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("origin", &self.origin)
			.field("categories", &self.categories)
			.field("hook", &self.hook)
			.field("enabled", &self.is_enabled())
			.finish()
	}
}

/// Extracts the message from a caught panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"<non-string panic payload>".to_string()
	}
}

/// Public handle to a registered listener.
///
/// Cloning the handle does not duplicate the listener.
#[derive(Clone)]
pub struct ListenerHandle(pub(crate) Arc<Listener>);

impl ListenerHandle {
	pub fn id(&self) -> ListenerId {
		self.0.id()
	}

	pub fn name(&self) -> Option<&str> {
		self.0.name()
	}

	pub fn origin(&self) -> &Origin {
		self.0.origin()
	}

	pub fn categories(&self) -> &CategorySet {
		self.0.categories()
	}

	pub fn is_enabled(&self) -> bool {
		self.0.is_enabled()
	}

	/// Enables or disables the callback.
	///
	/// Attachment bookkeeping is unaffected: re-enabling does not replay
	/// setups that were suppressed while disabled.
	pub fn set_enabled(&self, enabled: bool) {
		tracing::debug!(listener = %self.0, enabled, "listener.toggled");
		self.0.set_enabled(enabled);
	}

	/// Number of live objects this listener is attached to.
	pub fn attached_count(&self) -> usize {
		self.0.attached_count()
	}

	/// Returns true if the listener is attached to `obj`.
	pub fn is_attached_to(&self, obj: &ObjectRef) -> bool {
		self.0.is_attached(obj.core().id())
	}
}

impl fmt::Debug for ListenerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for ListenerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.0, f)
	}
}

#[cfg(test)]
mod tests;
