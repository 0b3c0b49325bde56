//! Optional observability helpers for session requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `nb_session.request` with the `verb` and
//!   `path` fields, plus events for throttle episodes and failed requests.
//! - Enable `metrics` to increment the `nb_session_request_total` counter for every
//!   attempt/success/failure, labeled by `verb` + `outcome`, and the `nb_session_throttle_total`
//!   counter labeled by `role`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// crates.io
use ::http::Method;
// self
use crate::_prelude::*;

/// Request verbs observed by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestVerb {
	/// `GET` reads, including pagination walks.
	Get,
	/// `PUT` updates.
	Put,
	/// `POST` creations.
	Create,
	/// `DELETE` removals.
	Delete,
	/// Any other HTTP method.
	Other,
}
impl RequestVerb {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestVerb::Get => "get",
			RequestVerb::Put => "put",
			RequestVerb::Create => "create",
			RequestVerb::Delete => "delete",
			RequestVerb::Other => "other",
		}
	}
}
impl From<&Method> for RequestVerb {
	fn from(method: &Method) -> Self {
		match *method {
			Method::GET => RequestVerb::Get,
			Method::PUT => RequestVerb::Put,
			Method::POST => RequestVerb::Create,
			Method::DELETE => RequestVerb::Delete,
			_ => RequestVerb::Other,
		}
	}
}
impl Display for RequestVerb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to the executor.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
