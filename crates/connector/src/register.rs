//! Registration builders used by configuration code.
//!
//! ```ignore
//! connector
//!     .listen("editor")
//!     .named("report_saves")
//!     .signal("file_saved", |editor, args| {
//!         tracing::info!(%editor, path = ?args.first(), "saved");
//!         Ok(())
//!     })?;
//! ```

use std::sync::Arc;

use eye_primitives::{Arg, CategorySet, Event, EventMask, IntoCategories, well_known};

use crate::Connector;
use crate::error::Result;
use crate::listener::{Hook, ListenerHandle, Origin};
use crate::object::ObjectRef;

/// Signal emitted by editors when their lexer changes.
pub const LEXER_CHANGED: &str = "lexer_changed";

/// Pending registration for a set of categories.
#[must_use = "a registration does nothing until a terminal method is called"]
pub struct Listen<'c> {
	connector: &'c Connector,
	categories: CategorySet,
	name: Option<Box<str>>,
	origin: Origin,
	enabled: bool,
}

impl Connector {
	/// Starts a registration for objects matching any of `categories`.
	///
	/// The origin defaults to the caller's source location.
	#[track_caller]
	pub fn listen(&self, categories: impl IntoCategories) -> Listen<'_> {
		Listen {
			connector: self,
			categories: categories.into_categories(),
			name: None,
			origin: Origin::caller(),
			enabled: true,
		}
	}
}

impl Listen<'_> {
	/// Names the listener; names are matched against the `disabled` option.
	pub fn named(mut self, name: impl Into<Box<str>>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Overrides the origin, e.g. with the path of a reloadable script.
	pub fn origin(mut self, origin: impl AsRef<str>) -> Self {
		self.origin = Origin::file(origin);
		self
	}

	/// Registers the listener disabled.
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	/// Runs `cb` once for every object that starts matching, including those already live.
	pub fn setup<F>(self, cb: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.finish(Hook::Setup(Arc::new(cb)))
	}

	/// Runs `cb` once for every object that stops matching.
	pub fn teardown<F>(self, cb: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.finish(Hook::Teardown(Arc::new(cb)))
	}

	/// Calls `slot` each time a matching object emits `signal`.
	///
	/// `"connected"` and `"disconnected"` behave like [`setup`](Self::setup)
	/// and [`teardown`](Self::teardown) with an empty payload.
	pub fn signal<F>(self, signal: &str, slot: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef, &[Arg]) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.finish(Hook::from_signal(signal, Arc::new(slot)))
	}

	/// Intercepts raw events of the given kinds on matching objects.
	///
	/// Returning `Ok(true)` consumes the event: it reaches neither later
	/// filters nor the object itself.
	pub fn event_filter<F>(self, kinds: impl Into<EventMask>, filter: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef, &Event) -> anyhow::Result<bool> + Send + Sync + 'static,
	{
		let hook = Hook::Filter {
			mask: kinds.into(),
			filter: Arc::new(filter),
		};
		self.finish(hook)
	}

	fn finish(self, hook: Hook) -> Result<ListenerHandle> {
		self.connector.register(self.categories, hook, self.name, self.origin, self.enabled)
	}
}

/// Runs `cb` for every editor, existing and future.
#[track_caller]
pub fn default_editor_config<F>(connector: &Connector, cb: F) -> Result<ListenerHandle>
where
	F: Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync + 'static,
{
	connector.listen(well_known::EDITOR).setup(cb)
}

/// Runs `cb` for every window, existing and future.
#[track_caller]
pub fn default_window_config<F>(connector: &Connector, cb: F) -> Result<ListenerHandle>
where
	F: Fn(&ObjectRef) -> anyhow::Result<()> + Send + Sync + 'static,
{
	connector.listen(well_known::WINDOW).setup(cb)
}

/// Calls `cb` whenever an editor's lexer changes.
#[track_caller]
pub fn default_lexer_config<F>(connector: &Connector, cb: F) -> Result<ListenerHandle>
where
	F: Fn(&ObjectRef, &[Arg]) -> anyhow::Result<()> + Send + Sync + 'static,
{
	connector.listen(well_known::EDITOR).signal(LEXER_CHANGED, cb)
}
