//! Widgets shared by the connector integration tests.

use std::sync::Arc;

use eye_connector::{Connector, IntoCategories, ObjectCore, ObjectRef, Target};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Minimal widget carrying nothing but its categories.
pub struct Pane {
	core: ObjectCore,
}

impl Target for Pane {
	fn core(&self) -> &ObjectCore {
		&self.core
	}
}

pub fn pane(connector: &Connector, categories: impl IntoCategories) -> ObjectRef {
	let pane: Arc<Pane> = connector.spawn(|core| Pane {
		core: core.with_categories(categories),
	});
	pane
}
