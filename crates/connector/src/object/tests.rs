use super::*;
use crate::testing::{Widget, as_ref, child_of, widget, widget_with};

struct Window {
	core: ObjectCore,
	title: String,
}

impl Target for Window {
	fn core(&self) -> &ObjectCore {
		&self.core
	}

	fn label(&self) -> Cow<'_, str> {
		Cow::Owned(format!("Window[{}]", self.title))
	}
}

#[test]
fn categories_returns_a_copy() {
	let connector = Connector::new();
	let w = widget_with(&connector, "editor");

	let mut copy = w.core().categories();
	copy.insert("window");

	assert!(!w.core().has_category("window"));
	assert_eq!(w.core().categories().len(), 1);
}

#[test]
fn add_and_remove_are_idempotent() {
	let connector = Connector::new();
	let w = widget(&connector);

	w.core().add_category("editor");
	w.core().add_category("editor");
	assert_eq!(w.core().categories().len(), 1);

	w.core().remove_category("editor");
	w.core().remove_category("editor");
	assert!(w.core().categories().is_empty());
}

#[test]
fn ids_are_unique_and_monotonic() {
	let connector = Connector::new();
	let a = widget(&connector);
	let b = widget(&connector);
	assert!(a.core().id() < b.core().id());
}

#[test]
fn back_reference_is_unavailable_while_building() {
	let connector = Connector::new();
	let mut seen_during_build = true;
	let w = connector.spawn(|core| {
		seen_during_build = core.this().is_some();
		Window {
			core,
			title: "main".into(),
		}
	});

	assert!(!seen_during_build);
	assert!(w.core().this().is_some());
}

#[test]
fn label_drives_display() {
	let connector = Connector::new();
	let win: ObjectRef = connector.spawn(|core| Window {
		core,
		title: "main".into(),
	});
	let plain = as_ref(&widget(&connector));

	assert_eq!(win.to_string(), format!("Window[main]{}", win.core().id()));
	assert_eq!(plain.to_string(), format!("Widget{}", plain.core().id()));
}

#[test]
fn downcast_recovers_the_widget() {
	let connector = Connector::new();
	let win: ObjectRef = connector.spawn(|core| Window {
		core,
		title: "main".into(),
	});

	assert!(win.is::<Window>());
	assert!(!win.is::<Widget>());
	assert_eq!(win.downcast_ref::<Window>().map(|w| w.title.as_str()), Some("main"));

	let win = match downcast::<Widget>(win) {
		Ok(_) => panic!("not a widget"),
		Err(obj) => obj,
	};
	let concrete = downcast::<Window>(win).ok().unwrap();
	assert_eq!(concrete.title, "main");
}

#[test]
fn descendants_follow_parent_chain() {
	let connector = Connector::new();
	let root = as_ref(&widget(&connector));
	let mid = as_ref(&child_of(&connector, &root, "splitter"));
	let leaf = as_ref(&child_of(&connector, &mid, "editor"));
	let other = as_ref(&widget(&connector));

	assert!(leaf.is_descendant_of(&*root));
	assert!(leaf.is_descendant_of(&*leaf));
	assert!(!root.is_descendant_of(&*leaf));
	assert!(!leaf.is_descendant_of(&*other));
}

#[test]
fn dropping_the_object_forgets_it() {
	let connector = Connector::new();
	let w = widget_with(&connector, "editor");
	let id = w.core().id();
	assert!(connector.object(id).is_some());

	drop(w);
	assert!(connector.object(id).is_none());
	assert_eq!(connector.live_object_count(), 0);
}
