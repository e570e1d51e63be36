//! Connector-wide notifications of category changes.
//!
//! Unlike ordinary listeners, watchers hear about every category added to or
//! removed from any object, after the matching listeners have been connected
//! or disconnected. Shortcut tables keyed by category are built this way.

use std::fmt;
use std::sync::Arc;

use eye_primitives::{Category, CategorySet};

use crate::Connector;
use crate::error::Result;
use crate::listener::{Hook, Listener, ListenerHandle, Origin};
use crate::object::ObjectRef;

/// Prefix of the private categories given to watchers.
pub const WATCH_CATEGORY_PREFIX: &str = "@watch/";

/// Direction of a category change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryChange {
	Added,
	Removed,
}

impl fmt::Display for CategoryChange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Added => "added",
			Self::Removed => "removed",
		})
	}
}

impl Connector {
	/// Calls `cb` for every category added to or removed from any object.
	#[track_caller]
	pub fn on_category_change<F>(&self, cb: F) -> Result<ListenerHandle>
	where
		F: Fn(&ObjectRef, &Category, CategoryChange) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		let mut categories = CategorySet::new();
		categories.insert(format!("{WATCH_CATEGORY_PREFIX}{}", self.next_id()));
		self.register(categories, Hook::Watch(Arc::new(cb)), None, Origin::caller(), true)
	}

	pub(crate) fn notify_category_change(&self, listeners: &[Arc<Listener>], obj: &ObjectRef, cat: &Category, change: CategoryChange) {
		for listener in listeners {
			if matches!(listener.hook(), Hook::Watch(_)) {
				tracing::trace!(object = %obj, listener = %listener, category = %cat, %change, "connector.category.watched");
				listener.watch(obj, cat, change);
			}
		}
	}
}
