use smallvec::SmallVec;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::Arg;

/// Type tag of a raw input event delivered to an object.
///
/// Names are snake_case when parsed from or rendered to text, e.g. `key_press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
	KeyPress,
	KeyRelease,
	MouseButtonPress,
	MouseButtonRelease,
	MouseButtonDoubleClick,
	MouseMove,
	Wheel,
	FocusIn,
	FocusOut,
	Enter,
	Leave,
	Show,
	Hide,
	Resize,
	Close,
	Drop,
	ContextMenu,
}

bitflags::bitflags! {
	/// A set of event kinds an event-filter listener intercepts.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct EventMask: u32 {
		const KEY_PRESS = 1 << 0;
		const KEY_RELEASE = 1 << 1;
		const MOUSE_BUTTON_PRESS = 1 << 2;
		const MOUSE_BUTTON_RELEASE = 1 << 3;
		const MOUSE_BUTTON_DOUBLE_CLICK = 1 << 4;
		const MOUSE_MOVE = 1 << 5;
		const WHEEL = 1 << 6;
		const FOCUS_IN = 1 << 7;
		const FOCUS_OUT = 1 << 8;
		const ENTER = 1 << 9;
		const LEAVE = 1 << 10;
		const SHOW = 1 << 11;
		const HIDE = 1 << 12;
		const RESIZE = 1 << 13;
		const CLOSE = 1 << 14;
		const DROP = 1 << 15;
		const CONTEXT_MENU = 1 << 16;

		/// Both key press and key release.
		const KEY = Self::KEY_PRESS.bits() | Self::KEY_RELEASE.bits();
		/// Both focus directions.
		const FOCUS = Self::FOCUS_IN.bits() | Self::FOCUS_OUT.bits();
	}
}

impl EventKind {
	/// Returns the mask bit for this kind.
	pub const fn mask(self) -> EventMask {
		match self {
			Self::KeyPress => EventMask::KEY_PRESS,
			Self::KeyRelease => EventMask::KEY_RELEASE,
			Self::MouseButtonPress => EventMask::MOUSE_BUTTON_PRESS,
			Self::MouseButtonRelease => EventMask::MOUSE_BUTTON_RELEASE,
			Self::MouseButtonDoubleClick => EventMask::MOUSE_BUTTON_DOUBLE_CLICK,
			Self::MouseMove => EventMask::MOUSE_MOVE,
			Self::Wheel => EventMask::WHEEL,
			Self::FocusIn => EventMask::FOCUS_IN,
			Self::FocusOut => EventMask::FOCUS_OUT,
			Self::Enter => EventMask::ENTER,
			Self::Leave => EventMask::LEAVE,
			Self::Show => EventMask::SHOW,
			Self::Hide => EventMask::HIDE,
			Self::Resize => EventMask::RESIZE,
			Self::Close => EventMask::CLOSE,
			Self::Drop => EventMask::DROP,
			Self::ContextMenu => EventMask::CONTEXT_MENU,
		}
	}
}

impl EventMask {
	/// Returns true if `kind` is part of the mask.
	pub const fn accepts(self, kind: EventKind) -> bool {
		self.contains(kind.mask())
	}
}

impl From<EventKind> for EventMask {
	fn from(kind: EventKind) -> Self {
		kind.mask()
	}
}

impl<const N: usize> From<[EventKind; N]> for EventMask {
	fn from(kinds: [EventKind; N]) -> Self {
		kinds.into_iter().collect()
	}
}

impl FromIterator<EventKind> for EventMask {
	fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
		let mut mask = EventMask::empty();
		for kind in iter {
			mask |= kind.mask();
		}
		mask
	}
}

/// A raw input event sent to an object.
#[derive(Debug, Clone)]
pub struct Event {
	kind: EventKind,
	args: SmallVec<[Arg; 2]>,
}

impl Event {
	pub fn new(kind: EventKind) -> Self {
		Self {
			kind,
			args: SmallVec::new(),
		}
	}

	/// Appends a payload value, e.g. the key text or cursor position.
	pub fn with_arg(mut self, arg: impl Into<Arg>) -> Self {
		self.args.push(arg.into());
		self
	}

	pub fn kind(&self) -> EventKind {
		self.kind
	}

	pub fn args(&self) -> &[Arg] {
		&self.args
	}
}

impl From<EventKind> for Event {
	fn from(kind: EventKind) -> Self {
		Self::new(kind)
	}
}
