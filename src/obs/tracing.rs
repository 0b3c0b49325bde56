// self
use crate::{_prelude::*, obs::RequestVerb};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by the request executor.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided verb + request path.
	pub fn new(verb: RequestVerb, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("nb_session.request", verb = verb.as_str(), path);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (verb, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a failed request at the level matching its cause (when enabled).
pub fn record_failure(err: &Error) {
	#[cfg(feature = "tracing")]
	{
		match err {
			Error::HttpStatus { status, .. } => tracing::warn!(status, "request rejected"),
			Error::SessionClosed => tracing::debug!("request refused after session close"),
			other => tracing::warn!(error = %other, "request failed"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
