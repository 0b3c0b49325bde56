// self
use crate::{
	_prelude::*,
	obs::{RequestOutcome, RequestVerb},
	throttle::BackoffRole,
};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(verb: RequestVerb, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"nb_session_request_total",
			"verb" => verb.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (verb, outcome);
	}
}

/// Records a throttle episode participant and logs the pause (when enabled).
pub fn record_backoff(role: BackoffRole, duration: Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("nb_session_throttle_total", "role" => role.as_str()).increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		match role {
			BackoffRole::Sleeper => tracing::info!(
				reset_in_ms = duration.whole_milliseconds() as i64,
				"quota nearly exhausted; pausing all requests"
			),
			BackoffRole::Waiter => tracing::debug!("waiting for the active quota pause to end"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	let _ = (role, duration);
}
