//! Shared pause coordinator that elects a single sleeper per quota episode.
//!
//! When a response reports that the quota is nearly spent, every in-flight request would
//! otherwise sleep its own copy of the reset interval. [`ThrottleGate`] instead lets the first
//! observer own the pause while every later caller parks until that pause ends. New requests
//! also park on the gate before they are built, so a pause holds back all traffic for the
//! session that owns it.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::sync::watch;
// self
use crate::{_prelude::*, obs};

/// Part a caller played in a pause episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackoffRole {
	/// The caller that started the episode and slept through it.
	Sleeper,
	/// A caller that parked until the active episode ended.
	Waiter,
}
impl BackoffRole {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BackoffRole::Sleeper => "sleeper",
			BackoffRole::Waiter => "waiter",
		}
	}
}
impl Display for BackoffRole {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-session pause gate; clones share the same state.
#[derive(Clone, Debug)]
pub struct ThrottleGate(Arc<GateState>);
impl ThrottleGate {
	/// Creates an open gate.
	pub fn new() -> Self {
		let (paused, _) = watch::channel(false);

		Self(Arc::new(GateState { paused, episodes: AtomicU64::new(0) }))
	}

	/// Whether a pause episode is currently active.
	pub fn is_paused(&self) -> bool {
		*self.0.paused.borrow()
	}

	/// Number of pause episodes started since the gate was created.
	pub fn episodes(&self) -> u64 {
		self.0.episodes.load(Ordering::Acquire)
	}

	/// Waits until no pause is active. Returns immediately on an open gate.
	pub async fn wait_clear(&self) {
		let mut rx = self.0.paused.subscribe();

		// The sender lives as long as `self`, so the wait cannot observe a closed channel.
		let _ = rx.wait_for(|paused| !*paused).await;
	}

	/// Pauses for `duration` unless another caller already owns the current pause, in which
	/// case this call only waits for that pause to end.
	///
	/// Non-positive durations still elect a sleeper but release waiters immediately.
	pub async fn enter_backoff(&self, duration: Duration) -> BackoffRole {
		let elected = self.0.paused.send_if_modified(|paused| {
			if *paused {
				false
			} else {
				*paused = true;

				true
			}
		});

		if !elected {
			obs::record_backoff(BackoffRole::Waiter, duration);
			self.wait_clear().await;

			return BackoffRole::Waiter;
		}

		self.0.episodes.fetch_add(1, Ordering::AcqRel);
		obs::record_backoff(BackoffRole::Sleeper, duration);

		let _reopen = ReopenOnDrop(&self.0);
		let sleep = sleep_interval(duration);

		if !sleep.is_zero() {
			tokio::time::sleep(sleep).await;
		}

		BackoffRole::Sleeper
	}
}
impl Default for ThrottleGate {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug)]
struct GateState {
	paused: watch::Sender<bool>,
	episodes: AtomicU64,
}

/// Converts a reset interval into a sleepable duration; past instants clamp to zero.
fn sleep_interval(reset_in: Duration) -> std::time::Duration {
	std::time::Duration::try_from(reset_in).unwrap_or_default()
}

/// Reopens the gate when the sleeper finishes or its future is dropped mid-sleep.
struct ReopenOnDrop<'a>(&'a GateState);
impl Drop for ReopenOnDrop<'_> {
	fn drop(&mut self) {
		self.0.paused.send_replace(false);
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::time::Instant;
	// self
	use super::*;

	#[tokio::test]
	async fn first_caller_sleeps_and_later_callers_wait() {
		let gate = ThrottleGate::new();
		let started = Instant::now();
		let sleeper = tokio::spawn({
			let gate = gate.clone();

			async move { gate.enter_backoff(Duration::milliseconds(200)).await }
		});

		tokio::time::sleep(std::time::Duration::from_millis(20)).await;

		assert!(gate.is_paused());

		let waiters = (0..4)
			.map(|_| {
				let gate = gate.clone();

				// A stale, much longer interval must not be slept by waiters.
				tokio::spawn(async move { gate.enter_backoff(Duration::seconds(30)).await })
			})
			.collect::<Vec<_>>();

		assert_eq!(sleeper.await.expect("Sleeper task should finish."), BackoffRole::Sleeper);

		for waiter in waiters {
			assert_eq!(waiter.await.expect("Waiter task should finish."), BackoffRole::Waiter);
		}

		let elapsed = started.elapsed();

		assert!(elapsed >= std::time::Duration::from_millis(200));
		assert!(elapsed < std::time::Duration::from_secs(5));
		assert_eq!(gate.episodes(), 1);
		assert!(!gate.is_paused());
	}

	#[test]
	fn sleep_interval_clamps_past_resets() {
		assert_eq!(
			sleep_interval(Duration::milliseconds(2_500)),
			std::time::Duration::from_millis(2_500)
		);
		assert_eq!(sleep_interval(Duration::ZERO), std::time::Duration::ZERO);
		assert_eq!(sleep_interval(Duration::seconds(-3)), std::time::Duration::ZERO);
	}

	#[tokio::test]
	async fn non_positive_durations_do_not_sleep() {
		let gate = ThrottleGate::new();
		let started = Instant::now();

		assert_eq!(gate.enter_backoff(Duration::seconds(-3)).await, BackoffRole::Sleeper);
		assert_eq!(gate.enter_backoff(Duration::ZERO).await, BackoffRole::Sleeper);
		assert!(started.elapsed() < std::time::Duration::from_millis(100));
		assert_eq!(gate.episodes(), 2);
		assert!(!gate.is_paused());
	}

	#[tokio::test]
	async fn cancelled_sleeper_reopens_the_gate() {
		let gate = ThrottleGate::new();
		let pause = tokio::spawn({
			let gate = gate.clone();

			async move { gate.enter_backoff(Duration::seconds(60)).await }
		});

		tokio::time::sleep(std::time::Duration::from_millis(20)).await;

		assert!(gate.is_paused());

		pause.abort();

		let _ = pause.await;

		tokio::time::timeout(std::time::Duration::from_secs(1), gate.wait_clear())
			.await
			.expect("Aborting the sleeper should release waiters.");
	}

	#[tokio::test]
	async fn gates_are_independent() {
		let first = ThrottleGate::new();
		let second = ThrottleGate::new();
		let pause = tokio::spawn({
			let first = first.clone();

			async move { first.enter_backoff(Duration::seconds(60)).await }
		});

		tokio::time::sleep(std::time::Duration::from_millis(20)).await;

		assert!(first.is_paused());
		assert!(!second.is_paused());

		pause.abort();
	}
}
