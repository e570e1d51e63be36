//! Category-based event connector.
//!
//! Configuration code attaches behavior to groups of live widgets without
//! either side knowing about the other ahead of time. Widgets carry a mutable
//! set of string categories; listeners name the categories they care about
//! and how to attach: a one-shot setup or teardown, a named signal, a raw
//! event filter, a timer or a category watch. The [`Connector`] keeps every
//! listener attached to exactly the objects whose categories intersect its
//! own as both sides change.
//!
//! # Modules
//!
//! - [`connector`] - Registry core and match bookkeeping
//! - [`listener`] - Listener kinds, handles and guarded dispatch
//! - [`object`] - The category mixin embedded in widgets
//! - [`register`] - Builder-style registration helpers
//! - [`timer`] - Interval timers driven by the host event loop
//! - [`watch`] - Connector-wide category change notifications
//! - [`options`] - TOML switches applied at registration

pub mod connector;
pub mod error;
pub mod listener;
pub mod object;
pub mod options;
mod plumbing;
pub mod register;
pub mod timer;
pub mod watch;

#[cfg(test)]
mod testing;

pub use connector::Connector;
pub use error::{ConnectorError, Result};
pub use eye_primitives::{Arg, Category, CategorySet, Event, EventKind, EventMask, IntoCategories, well_known};
pub use listener::{CONNECTED, DISCONNECTED, Hook, ListenerHandle, ListenerId, Origin};
pub use object::{ObjectCore, ObjectId, ObjectRef, Target, downcast};
pub use options::ConnectorOptions;
pub use register::{Listen, default_editor_config, default_lexer_config, default_window_config};
pub use timer::Schedule;
pub use watch::CategoryChange;
