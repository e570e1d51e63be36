//! Per-object signal slots and event-filter chains.
//!
//! Both hold strong references to listeners and are owned by the object, so a
//! destroyed object takes its subscriptions with it. Dispatch always works on
//! a snapshot taken under the lock; callbacks run with no lock held, so they
//! may connect, disconnect or emit freely.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::listener::{Listener, ListenerId};

type Slots = SmallVec<[Arc<Listener>; 2]>;

/// Named signal subscriptions of one object.
#[derive(Default)]
pub(crate) struct SignalHub {
	slots: Mutex<FxHashMap<Box<str>, Slots>>,
}

impl SignalHub {
	/// Subscribes `listener` to `signal`. A listener is subscribed at most once per signal.
	pub(crate) fn connect(&self, signal: &str, listener: Arc<Listener>) {
		let mut slots = self.slots.lock();
		let entry = slots.entry(signal.into()).or_default();
		if entry.iter().all(|l| l.id() != listener.id()) {
			entry.push(listener);
		}
	}

	/// Removes the subscription of `listener` to `signal`.
	pub(crate) fn disconnect(&self, signal: &str, listener: ListenerId) -> bool {
		let mut slots = self.slots.lock();
		let Some(entry) = slots.get_mut(signal) else {
			return false;
		};
		let before = entry.len();
		entry.retain(|l| l.id() != listener);
		let removed = entry.len() != before;
		if entry.is_empty() {
			slots.remove(signal);
		}
		removed
	}

	/// Returns the listeners subscribed to `signal`, in subscription order.
	pub(crate) fn snapshot(&self, signal: &str) -> Slots {
		self.slots.lock().get(signal).cloned().unwrap_or_default()
	}

	pub(crate) fn subscriber_count(&self, signal: &str) -> usize {
		self.slots.lock().get(signal).map_or(0, SmallVec::len)
	}
}

/// Installed event filters of one object, most recently installed first.
#[derive(Default)]
pub(crate) struct FilterChain {
	filters: Mutex<Vec<Arc<Listener>>>,
}

impl FilterChain {
	/// Installs `listener` at the front of the chain. Reinstalling moves it to the front.
	pub(crate) fn install(&self, listener: Arc<Listener>) {
		let mut filters = self.filters.lock();
		filters.retain(|l| l.id() != listener.id());
		filters.insert(0, listener);
	}

	pub(crate) fn remove(&self, listener: ListenerId) -> bool {
		let mut filters = self.filters.lock();
		let before = filters.len();
		filters.retain(|l| l.id() != listener);
		filters.len() != before
	}

	pub(crate) fn snapshot(&self) -> Vec<Arc<Listener>> {
		self.filters.lock().clone()
	}

	pub(crate) fn len(&self) -> usize {
		self.filters.lock().len()
	}
}
