//! Test widgets and call recorders shared by the unit tests.

use std::sync::Arc;

use eye_primitives::IntoCategories;
use parking_lot::Mutex;

use crate::{Connector, ObjectCore, ObjectRef, Target};

pub(crate) struct Widget {
	core: ObjectCore,
	parent: Option<ObjectRef>,
}

impl Target for Widget {
	fn core(&self) -> &ObjectCore {
		&self.core
	}

	fn parent(&self) -> Option<ObjectRef> {
		self.parent.clone()
	}
}

pub(crate) fn widget(connector: &Connector) -> Arc<Widget> {
	connector.spawn(|core| Widget { core, parent: None })
}

pub(crate) fn widget_with(connector: &Connector, categories: impl IntoCategories) -> Arc<Widget> {
	connector.spawn(|core| Widget {
		core: core.with_categories(categories),
		parent: None,
	})
}

pub(crate) fn child_of(connector: &Connector, parent: &ObjectRef, categories: impl IntoCategories) -> Arc<Widget> {
	connector.spawn(|core| Widget {
		core: core.with_categories(categories),
		parent: Some(parent.clone()),
	})
}

pub(crate) fn as_ref(widget: &Arc<Widget>) -> ObjectRef {
	widget.clone()
}

/// Shared call log.
#[derive(Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
	pub(crate) fn push(&self, entry: impl Into<String>) {
		self.0.lock().push(entry.into());
	}

	pub(crate) fn entries(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	pub(crate) fn count(&self, entry: &str) -> usize {
		self.0.lock().iter().filter(|e| *e == entry).count()
	}

	pub(crate) fn len(&self) -> usize {
		self.0.lock().len()
	}

	pub(crate) fn clear(&self) {
		self.0.lock().clear();
	}
}
