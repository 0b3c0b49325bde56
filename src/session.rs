//! Session root object: one logical API connection for one tenant.
//!
//! A [`Session`] owns the configuration, a [`ConcurrencyLimiter`], a [`ThrottleGate`], and the
//! transport. Clones are cheap and share all of them, so callers can hand a clone to every
//! spawned task. Each session owns an independent gate, so sessions for different tenants never
//! throttle each other. [`Session::close`] refuses new requests, waits for every running request
//! to reach a terminal state, and only then releases the transport.

pub mod executor;
pub mod walk;

mod metrics;
mod query;

pub use metrics::SessionMetrics;
pub use query::Query;
pub use walk::*;

// self
use crate::{
	_prelude::*,
	config::SessionConfig,
	limiter::{ConcurrencyLimiter, RunningRequest},
	throttle::ThrottleGate,
	transport::RestHttpClient,
};
#[cfg(feature = "reqwest")]
use crate::{
	auth::{AccessToken, TenantSlug},
	error::ConfigError,
	transport::ReqwestHttpClient,
};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport.
pub type ReqwestSession = Session<ReqwestHttpClient>;

/// Quota-aware client bound to a single tenant.
pub struct Session<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Validated configuration shared by every request.
	pub config: Arc<SessionConfig>,
	/// Admission control for in-flight requests.
	pub limiter: ConcurrencyLimiter,
	/// Pause gate engaged when the quota is nearly exhausted.
	pub gate: ThrottleGate,
	/// Shared request counters.
	pub metrics: Arc<SessionMetrics>,
	transport: Arc<RwLock<Option<Arc<C>>>>,
}
impl<C> Session<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Creates a session that sends every request through `http_client`.
	pub fn with_http_client(config: SessionConfig, http_client: impl Into<Arc<C>>) -> Self {
		let limiter = ConcurrencyLimiter::new(config.concurrency);

		Self {
			config: Arc::new(config),
			limiter,
			gate: ThrottleGate::new(),
			metrics: Default::default(),
			transport: Arc::new(RwLock::new(Some(http_client.into()))),
		}
	}

	/// Whether [`close`](Self::close) has been called.
	pub fn is_closed(&self) -> bool {
		self.limiter.is_closed()
	}

	/// Snapshot of the requests currently holding a concurrency slot.
	pub fn running(&self) -> Vec<RunningRequest> {
		self.limiter.running()
	}

	/// Refuses new requests, waits for running ones to finish, then releases the transport.
	///
	/// Requests queued for a slot at the time of the call fail with
	/// [`Error::SessionClosed`] without touching the transport. Calling `close` again is a
	/// no-op beyond waiting for the (already empty) running set.
	pub async fn close(&self) {
		#[cfg(feature = "tracing")]
		tracing::debug!(in_flight = self.limiter.in_flight(), "closing session");

		self.limiter.close().await;

		let released = self.transport.write().take();

		drop(released);

		#[cfg(feature = "tracing")]
		tracing::debug!("session closed");
	}

	pub(crate) fn transport(&self) -> Result<Arc<C>> {
		self.transport.read().clone().ok_or(Error::SessionClosed)
	}
}
#[cfg(feature = "reqwest")]
impl Session<ReqwestHttpClient> {
	/// Creates a session backed by a reqwest client built from `config`.
	pub fn new(config: SessionConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, http_client))
	}

	/// Opens a session for `slug` with default settings and the token read from `NB_TOKEN`.
	pub fn from_env(slug: TenantSlug) -> Result<Self> {
		let token = AccessToken::from_env()
			.ok_or(ConfigError::MissingAccessToken { env: crate::auth::ACCESS_TOKEN_ENV })?;

		Self::new(SessionConfig::builder(slug, token).build()?)
	}
}
impl<C> Clone for Session<C>
where
	C: ?Sized + RestHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			limiter: self.limiter.clone(),
			gate: self.gate.clone(),
			metrics: self.metrics.clone(),
			transport: self.transport.clone(),
		}
	}
}
impl<C> Debug for Session<C>
where
	C: ?Sized + RestHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("slug", &self.config.slug)
			.field("endpoint", &self.config.endpoint.as_str())
			.field("concurrency", &self.config.concurrency)
			.field("in_flight", &self.limiter.in_flight())
			.field("throttled", &self.gate.is_paused())
			.field("closed", &self.is_closed())
			.finish()
	}
}
