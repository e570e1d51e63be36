//! Interval timers driven by the host event loop.
//!
//! Timers are listeners that never match an object: each gets a private
//! `@timer/<n>` category. The event loop calls [`Connector::fire_due_timers`]
//! and may sleep until [`Connector::next_timer_deadline`]. Disabling a timer
//! keeps its schedule running but skips the callback.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eye_primitives::{Category, CategorySet};
use parking_lot::Mutex;

use crate::Connector;
use crate::error::Result;
use crate::listener::{Hook, ListenerHandle, Origin};

/// Prefix of the private categories given to timers.
pub const TIMER_CATEGORY_PREFIX: &str = "@timer/";

/// When a timer fires.
pub struct Schedule {
	interval: Duration,
	single_shot: bool,
	state: Mutex<ScheduleState>,
}

struct ScheduleState {
	/// `None` once a single-shot timer has fired, or when the next due time
	/// lies beyond what `Instant` can represent.
	next_due: Option<Instant>,
}

impl Schedule {
	/// Fires every `interval`, first after one interval has elapsed.
	pub fn every(interval: Duration) -> Self {
		Self::new(interval, false)
	}

	/// Fires once after `delay`.
	pub fn once_after(delay: Duration) -> Self {
		Self::new(delay, true)
	}

	fn new(interval: Duration, single_shot: bool) -> Self {
		Self {
			interval,
			single_shot,
			state: Mutex::new(ScheduleState {
				next_due: Instant::now().checked_add(interval),
			}),
		}
	}

	/// Overrides the first due time.
	pub fn starting_at(self, first_due: Instant) -> Self {
		self.state.lock().next_due = Some(first_due);
		self
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	pub fn is_single_shot(&self) -> bool {
		self.single_shot
	}

	/// Next due time, or `None` if the timer will never fire again.
	pub fn next_due(&self) -> Option<Instant> {
		self.state.lock().next_due
	}

	/// Consumes one due firing at `now`, advancing the schedule.
	///
	/// Missed periods collapse into a single firing.
	pub(crate) fn take_due(&self, now: Instant) -> bool {
		let mut state = self.state.lock();
		let Some(due) = state.next_due.filter(|due| *due <= now) else {
			return false;
		};
		state.next_due = if self.single_shot {
			None
		} else {
			match due.checked_add(self.interval) {
				Some(next) if next > now => Some(next),
				_ => now.checked_add(self.interval),
			}
		};
		true
	}
}

impl fmt::Display for Schedule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.single_shot {
			write!(f, "once after {:?}", self.interval)
		} else {
			write!(f, "every {:?}", self.interval)
		}
	}
}

impl Connector {
	/// Calls `tick` every `interval`.
	#[track_caller]
	pub fn every<F>(&self, interval: Duration, tick: F) -> Result<ListenerHandle>
	where
		F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.add_timer(Schedule::every(interval), Arc::new(tick), Origin::caller())
	}

	/// Calls `tick` once after `delay`.
	#[track_caller]
	pub fn once_after<F>(&self, delay: Duration, tick: F) -> Result<ListenerHandle>
	where
		F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.add_timer(Schedule::once_after(delay), Arc::new(tick), Origin::caller())
	}

	/// Registers a timer with an explicit schedule.
	#[track_caller]
	pub fn add_timer_with<F>(&self, schedule: Schedule, tick: F) -> Result<ListenerHandle>
	where
		F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
	{
		self.add_timer(schedule, Arc::new(tick), Origin::caller())
	}

	fn add_timer(&self, schedule: Schedule, tick: crate::listener::TickFn, origin: Origin) -> Result<ListenerHandle> {
		let categories = self.timer_categories();
		self.register(categories, Hook::Timer { schedule, tick }, None, origin, true)
	}

	fn timer_categories(&self) -> CategorySet {
		let mut set = CategorySet::new();
		set.insert(Category::from(format!("{TIMER_CATEGORY_PREFIX}{}", self.next_id())));
		set
	}

	/// Fires every timer due at `now`. Returns how many were due.
	pub fn fire_due_timers(&self, now: Instant) -> usize {
		let mut fired = 0;
		for listener in self.listener_snapshot().iter() {
			let Hook::Timer { schedule, .. } = listener.hook() else {
				continue;
			};
			if !schedule.take_due(now) {
				continue;
			}
			fired += 1;
			tracing::trace!(listener = %listener, "timer.fired");
			listener.tick();
		}
		fired
	}

	/// Earliest pending timer deadline, if any timer is still scheduled.
	pub fn next_timer_deadline(&self) -> Option<Instant> {
		self.listener_snapshot()
			.iter()
			.filter_map(|listener| match listener.hook() {
				Hook::Timer { schedule, .. } => schedule.next_due(),
				_ => None,
			})
			.min()
	}
}
