//! Concurrency ceiling plus the registry of running requests used for graceful shutdown.
//!
//! [`ConcurrencyLimiter::admit`] hands out an [`Admission`] once a slot is free. The admission
//! is registered in the limiter's running set for as long as it lives and deregisters itself on
//! drop, so every exit path of a request (success, error, cancellation) releases its slot.

// crates.io
use ::http::Method;
use async_lock::{Semaphore, SemaphoreGuardArc};
use tokio::sync::watch;
// self
use crate::_prelude::*;

/// Diagnostic entry describing one admitted request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningRequest {
	/// Identifier unique within the owning limiter.
	pub id: u64,
	/// HTTP method of the request.
	pub method: Method,
	/// Request path relative to the session endpoint.
	pub path: String,
	/// Instant the request obtained its slot.
	pub admitted_at: OffsetDateTime,
}

/// Admission control primitive that bounds simultaneous requests.
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
	ceiling: usize,
	slots: Arc<Semaphore>,
	registry: Arc<Registry>,
}
impl ConcurrencyLimiter {
	/// Creates a limiter admitting at most `ceiling` requests (minimum one).
	pub fn new(ceiling: usize) -> Self {
		let ceiling = ceiling.max(1);
		let (in_flight, _) = watch::channel(0);

		Self {
			ceiling,
			slots: Arc::new(Semaphore::new(ceiling)),
			registry: Arc::new(Registry { state: Mutex::new(RegistryState::default()), in_flight }),
		}
	}

	/// Maximum number of simultaneously admitted requests.
	pub fn ceiling(&self) -> usize {
		self.ceiling
	}

	/// Number of requests currently admitted.
	pub fn in_flight(&self) -> usize {
		*self.registry.in_flight.borrow()
	}

	/// Whether [`close`](Self::close) has been called.
	pub fn is_closed(&self) -> bool {
		self.registry.state.lock().closed
	}

	/// Snapshot of the running set ordered by admission.
	pub fn running(&self) -> Vec<RunningRequest> {
		let mut running =
			self.registry.state.lock().running.values().cloned().collect::<Vec<_>>();

		running.sort_by_key(|request| request.id);

		running
	}

	/// Waits for a free slot and registers the request in the running set.
	///
	/// Fails with [`Error::SessionClosed`] once the limiter is closed, including for callers
	/// that were already queued for a slot when the close happened.
	pub async fn admit(&self, method: Method, path: &str) -> Result<Admission> {
		if self.is_closed() {
			return Err(Error::SessionClosed);
		}

		let slot = self.slots.acquire_arc().await;
		let mut state = self.registry.state.lock();

		if state.closed {
			return Err(Error::SessionClosed);
		}

		let id = state.next_id;

		state.next_id += 1;
		state.running.insert(id, RunningRequest {
			id,
			method,
			path: path.to_owned(),
			admitted_at: OffsetDateTime::now_utc(),
		});
		self.registry.in_flight.send_replace(state.running.len());

		Ok(Admission { id, registry: self.registry.clone(), _slot: slot })
	}

	/// Waits until every admitted request has finished.
	pub async fn drain(&self) {
		let mut rx = self.registry.in_flight.subscribe();

		// The sender lives as long as `self`, so the wait cannot observe a closed channel.
		let _ = rx.wait_for(|count| *count == 0).await;
	}

	/// Refuses further admissions, then drains the running set.
	pub async fn close(&self) {
		self.registry.state.lock().closed = true;
		self.drain().await;
	}
}

/// Slot held by one admitted request; dropping it deregisters the request and frees the slot.
pub struct Admission {
	id: u64,
	registry: Arc<Registry>,
	// Dropped after `Drop::drop` deregisters, keeping the running set within the ceiling.
	_slot: SemaphoreGuardArc,
}
impl Admission {
	/// Identifier of the admitted request.
	pub fn id(&self) -> u64 {
		self.id
	}
}
impl Debug for Admission {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Admission").field("id", &self.id).finish()
	}
}
impl Drop for Admission {
	fn drop(&mut self) {
		let mut state = self.registry.state.lock();

		state.running.remove(&self.id);
		self.registry.in_flight.send_replace(state.running.len());
	}
}

#[derive(Debug)]
struct Registry {
	state: Mutex<RegistryState>,
	in_flight: watch::Sender<usize>,
}

#[derive(Debug, Default)]
struct RegistryState {
	next_id: u64,
	closed: bool,
	running: HashMap<u64, RunningRequest>,
}
