use std::sync::Arc;

use eye_primitives::{Arg, Event, EventKind, EventMask};

use super::*;
use crate::testing::{Log, as_ref, widget, widget_with};
use crate::{Connector, ConnectorError, Target};

#[test]
fn pseudo_signals_map_to_setup_and_teardown() {
	let slot: SlotFn = Arc::new(|_: &ObjectRef, _: &[Arg]| -> anyhow::Result<()> { Ok(()) });
	assert!(matches!(Hook::from_signal(CONNECTED, slot.clone()), Hook::Setup(_)));
	assert!(matches!(Hook::from_signal(DISCONNECTED, slot.clone()), Hook::Teardown(_)));
	assert!(matches!(Hook::from_signal("file_saved", slot), Hook::Signal { ref name, .. } if &**name == "file_saved"));
}

#[test]
fn connected_signal_fires_once_with_empty_payload() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "window");

	let inner = log.clone();
	connector
		.add_listener("window", CONNECTED, move |obj, args| {
			inner.push(format!("{obj}:{}", args.len()));
			Ok(())
		})
		.unwrap();

	assert_eq!(log.entries(), vec![format!("{}:0", as_ref(&w))]);
	assert_eq!(w.core().subscriber_count(CONNECTED), 0, "pseudo-signals never subscribe");
}

#[test]
fn signal_slot_receives_object_and_payload() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "editor");

	let inner = log.clone();
	connector
		.listen("editor")
		.signal("position_jumped", move |obj, args| {
			let line = args[0].as_int().unwrap_or_default();
			let col = args[1].as_int().unwrap_or_default();
			inner.push(format!("{obj}@{line}:{col}"));
			Ok(())
		})
		.unwrap();

	w.core().emit("position_jumped", &[Arg::from(3i64), Arg::from(7i64)]);
	w.core().emit("file_saved", &["/tmp/a".into()]);

	assert_eq!(log.entries(), vec![format!("{}@3:7", as_ref(&w))]);
}

#[test]
fn signal_subscription_follows_the_match() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget(&connector);

	let inner = log.clone();
	connector
		.listen(["editor", "minibuffer"])
		.signal("text_changed", move |_, _| {
			inner.push("changed");
			Ok(())
		})
		.unwrap();

	w.core().emit("text_changed", &[]);
	assert_eq!(log.len(), 0);

	w.core().add_category("editor");
	w.core().add_category("minibuffer");
	assert_eq!(w.core().subscriber_count("text_changed"), 1);
	w.core().emit("text_changed", &[]);
	assert_eq!(log.len(), 1);

	w.core().remove_category("editor");
	w.core().emit("text_changed", &[]);
	assert_eq!(log.len(), 2);

	w.core().remove_category("minibuffer");
	assert_eq!(w.core().subscriber_count("text_changed"), 0);
	w.core().emit("text_changed", &[]);
	assert_eq!(log.len(), 2);
}

#[test]
fn disabled_signal_slot_stays_subscribed_but_silent() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "editor");

	let inner = log.clone();
	let lis = connector
		.listen("editor")
		.disabled()
		.signal("file_saved", move |_, _| {
			inner.push("saved");
			Ok(())
		})
		.unwrap();

	w.core().emit("file_saved", &[]);
	assert_eq!(w.core().subscriber_count("file_saved"), 1);
	assert_eq!(log.len(), 0);

	lis.set_enabled(true);
	w.core().emit("file_saved", &[]);
	assert_eq!(log.len(), 1);
}

#[test]
fn failing_slot_does_not_stop_other_slots() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "editor");

	connector.listen("editor").signal("file_saved", |_, _| Err(anyhow::anyhow!("disk on fire"))).unwrap();
	connector.listen("editor").signal("file_saved", |_, args| panic!("bad payload {args:?}")).unwrap();
	let inner = log.clone();
	connector
		.listen("editor")
		.signal("file_saved", move |_, _| {
			inner.push("saved");
			Ok(())
		})
		.unwrap();

	w.core().emit("file_saved", &[]);
	assert_eq!(log.len(), 1);
}

#[test]
fn event_filter_consumes_matching_kinds() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "window");

	let inner = log.clone();
	connector
		.add_event_filter_listener("window", EventKind::Close, move |obj, ev| {
			inner.push(format!("{obj}:{}", ev.kind()));
			Ok(true)
		})
		.unwrap();

	assert!(w.core().send_event(&Event::new(EventKind::Close)));
	assert!(!w.core().send_event(&Event::new(EventKind::KeyPress)));
	assert_eq!(log.entries(), vec![format!("{}:close", as_ref(&w))]);
}

#[test]
fn pass_through_filters_let_later_filters_run() {
	let connector = Connector::new();
	let log = Log::default();
	let w = widget_with(&connector, "editor");

	let first = log.clone();
	connector
		.listen("editor")
		.event_filter(EventMask::KEY, move |_, _| {
			first.push("first");
			Ok(false)
		})
		.unwrap();
	let second = log.clone();
	connector
		.listen("editor")
		.event_filter(EventMask::KEY, move |_, _| {
			second.push("second");
			Ok(true)
		})
		.unwrap();

	// Most recently installed filter runs first and consumes the event.
	assert!(w.core().send_event(&Event::new(EventKind::KeyPress)));
	assert_eq!(log.entries(), vec!["second"]);
	assert_eq!(w.core().filter_count(), 2);
}

#[test]
fn failing_or_disabled_filters_pass_events_through() {
	let connector = Connector::new();
	let w = widget_with(&connector, "editor");

	connector.listen("editor").event_filter(EventKind::KeyPress, |_, _| Err(anyhow::anyhow!("nope"))).unwrap();
	let disabled = connector.listen("editor").disabled().event_filter(EventKind::KeyPress, |_, _| Ok(true)).unwrap();

	assert!(!w.core().send_event(&Event::new(EventKind::KeyPress)));
	disabled.set_enabled(true);
	assert!(w.core().send_event(&Event::new(EventKind::KeyPress)));
}

#[test]
fn filter_is_removed_when_match_ends() {
	let connector = Connector::new();
	let w = widget_with(&connector, "editor");
	connector.listen("editor").event_filter(EventKind::Wheel, |_, _| Ok(true)).unwrap();

	assert_eq!(w.core().filter_count(), 1);
	w.core().remove_category("editor");
	assert_eq!(w.core().filter_count(), 0);
	assert!(!w.core().send_event(&Event::new(EventKind::Wheel)));
}

#[test]
fn empty_event_mask_is_rejected() {
	let connector = Connector::new();
	let err = connector.listen("editor").event_filter(EventMask::empty(), |_, _| Ok(true)).unwrap_err();
	assert!(matches!(err, ConnectorError::EmptyEventMask { .. }), "got {err:?}");
}

#[test]
fn origin_defaults_to_caller_location() {
	let connector = Connector::new();
	let lis = connector.listen("editor").setup(|_| Ok(())).unwrap();

	assert!(lis.origin().path().ends_with("tests.rs"), "origin was {}", lis.origin());
	assert!(lis.origin().line().is_some());
}

#[test]
fn explicit_origin_has_no_line() {
	let origin = Origin::file("plugins/blame.rs");
	assert_eq!(origin.to_string(), "plugins/blame.rs");
	assert!(origin.matches("blame.rs"));
	assert!(origin.matches("plugins/blame.rs"));
	assert!(!origin.matches("lame.rs"));
}

#[test]
fn listener_display_names_kind() {
	let connector = Connector::new();
	let lis = connector.listen("editor").named("autosave").signal("file_saved", |_, _| Ok(())).unwrap();
	let shown = lis.to_string();
	assert!(shown.contains("`autosave`"), "{shown}");
	assert!(shown.contains("signal file_saved"), "{shown}");
}

#[test]
fn panic_message_extracts_strings() {
	let payload: Box<dyn Any + Send> = Box::new("static");
	assert_eq!(panic_message(payload.as_ref()), "static");
	let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
	assert_eq!(panic_message(payload.as_ref()), "owned");
	let payload: Box<dyn Any + Send> = Box::new(42u8);
	assert_eq!(panic_message(payload.as_ref()), "<non-string panic payload>");
}
