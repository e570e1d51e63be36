//! Value types shared by the category connector and the widgets it wires up.
//!
//! Nothing here knows about the registry itself: categories are plain string
//! labels, signal payloads are a small dynamically typed [`Arg`] enum, and raw
//! input events are described by [`Event`] and filtered with [`EventMask`].

/// Signal payload values.
pub mod arg;
/// Category labels and ordered category sets.
pub mod category;
/// Raw input events and event-type masks.
pub mod event;

pub use arg::Arg;
pub use category::{Category, CategorySet, IntoCategories, well_known};
pub use event::{Event, EventKind, EventMask};
