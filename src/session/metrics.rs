// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::throttle::BackoffRole;

/// Thread-safe counters shared by every clone of a session.
#[derive(Debug, Default)]
pub struct SessionMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	pauses: AtomicU64,
	waits: AtomicU64,
}
impl SessionMetrics {
	/// Returns the total number of requests submitted to the executor.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that returned a decoded body.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that failed for any reason.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how many requests slept through a quota pause they started.
	pub fn pauses(&self) -> u64 {
		self.pauses.load(Ordering::Relaxed)
	}

	/// Returns how many requests parked behind another request's quota pause.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_backoff(&self, role: BackoffRole) {
		match role {
			BackoffRole::Sleeper => self.pauses.fetch_add(1, Ordering::Relaxed),
			BackoffRole::Waiter => self.waits.fetch_add(1, Ordering::Relaxed),
		};
	}
}
