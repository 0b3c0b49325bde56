//! Session-level error types shared by the executor, limiter, and pagination walker.

// self
use crate::_prelude::*;

/// Session-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical session error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Required rate-limit headers were absent or unreadable.
	#[error(transparent)]
	RateHeader(#[from] RateHeaderError),
	/// Pagination envelope could not be followed.
	#[error(transparent)]
	Pagination(#[from] PaginationError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Service answered with a non-2xx status.
	#[error("Service responded with HTTP {status}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
		/// Raw response body, lossily decoded as UTF-8.
		body: String,
	},
	/// The session was closed before the request was admitted.
	#[error("Session is closed.")]
	SessionClosed,
}
impl Error {
	/// Returns the HTTP status for [`Error::HttpStatus`] failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Endpoint host or path cannot be assembled into a URL.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path would leave the endpoint (absolute URL, scheme-relative, or dot segment).
	#[error("Request path must stay under the endpoint: {path}.")]
	InvalidPath {
		/// Rejected request path.
		path: String,
	},
	/// Endpoint must use HTTPS outside loopback hosts.
	#[error("The endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint URL cannot carry a path.
	#[error("The endpoint cannot be used as a base URL: {url}.")]
	OpaqueEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// No access token was supplied or found in the environment.
	#[error("Access token is missing; set the `{env}` environment variable.")]
	MissingAccessToken {
		/// Environment variable that was consulted.
		env: &'static str,
	},
	/// Concurrency ceiling must admit at least one request.
	#[error("Concurrency ceiling must be at least 1.")]
	ZeroConcurrency,
	/// Page size must be at least one item.
	#[error("Page size must be at least 1.")]
	ZeroPageSize,
	/// Rate-limit header name is not a valid HTTP header name.
	#[error("Rate-limit header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Rejected header name.
		name: String,
	},
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	PayloadSerialize(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures reading the quota headers from an otherwise successful response.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RateHeaderError {
	/// The header was not present.
	#[error("Response is missing the `{header}` header.")]
	Missing {
		/// Header name that was expected.
		header: String,
	},
	/// The header value was not a usable number.
	#[error("Response header `{header}` is not numeric: {value:?}.")]
	Malformed {
		/// Header name that failed to parse.
		header: String,
		/// Raw header value, lossily decoded.
		value: String,
	},
}

/// Failures following the `next` link of a paginated listing.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PaginationError {
	/// A `next` link was present but did not carry the cursor parameters.
	#[error("Pagination link is missing the `{param}` parameter: {next}.")]
	MissingCursor {
		/// Cursor parameter that could not be found.
		param: &'static str,
		/// Offending `next` link.
		next: String,
	},
	/// The service handed back a cursor that was already followed.
	#[error("Pagination cursor repeated after {pages} pages.")]
	RepeatedCursor {
		/// Pages fetched before the repeat was detected.
		pages: usize,
	},
	/// The configured page cap was reached while the service still reported more pages.
	#[error("Pagination exceeded the limit of {max} pages.")]
	PageLimit {
		/// Configured cap.
		max: usize,
	},
}

/// Response body decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON or did not match the requested shape.
	#[error("Response body does not match the expected JSON shape.")]
	Json {
		/// Structured parsing failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
