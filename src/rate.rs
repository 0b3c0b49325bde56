//! Quota headers and the [`RateWindow`] derived from them.
//!
//! Every successful response carries the remaining request count and the Unix instant at which
//! the quota resets. The executor turns those two headers into a [`RateWindow`] and compares the
//! remaining count against the session's concurrency ceiling to decide whether to pause.

// crates.io
use ::http::{HeaderMap, HeaderName};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, RateHeaderError},
};

/// Default header carrying the remaining request count.
pub const RATE_REMAINING_HEADER: &str = "X-Ratelimit-Remaining";
/// Default header carrying the quota reset instant as Unix epoch seconds.
pub const RATE_RESET_HEADER: &str = "X-Ratelimit-Reset";

/// Header names the executor reads quota information from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateHeaderNames {
	/// Integer header with the remaining request count.
	pub remaining: HeaderName,
	/// Float header with the reset instant in epoch seconds.
	pub reset: HeaderName,
}
impl RateHeaderNames {
	/// Validates and normalizes custom header names.
	pub fn new(remaining: &str, reset: &str) -> Result<Self, ConfigError> {
		Ok(Self { remaining: header_name(remaining)?, reset: header_name(reset)? })
	}
}
impl Default for RateHeaderNames {
	fn default() -> Self {
		Self {
			remaining: HeaderName::from_static("x-ratelimit-remaining"),
			reset: HeaderName::from_static("x-ratelimit-reset"),
		}
	}
}

/// Quota snapshot read from a single response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateWindow {
	/// Requests left in the current quota window.
	pub remaining: u64,
	/// Time until the quota resets; negative when the reset instant already passed.
	pub reset_in: Duration,
}
impl RateWindow {
	/// Reads both quota headers, measuring the reset interval from `now`.
	pub fn from_headers(
		headers: &HeaderMap,
		names: &RateHeaderNames,
		now: OffsetDateTime,
	) -> Result<Self, RateHeaderError> {
		let remaining = header_value(headers, &names.remaining)?;
		let remaining = remaining.parse::<u64>().map_err(|_| malformed(&names.remaining, remaining))?;
		let reset = header_value(headers, &names.reset)?;
		let reset_at = reset
			.parse::<f64>()
			.ok()
			.filter(|value| value.is_finite())
			.ok_or_else(|| malformed(&names.reset, reset))?;
		let now_secs = now.unix_timestamp_nanos() as f64 / 1_000_000_000.;

		Ok(Self { remaining, reset_in: Duration::saturating_seconds_f64(reset_at - now_secs) })
	}

	/// Whether the remaining quota no longer covers a full burst of `ceiling` requests.
	pub fn is_exhausting(&self, ceiling: usize) -> bool {
		self.remaining <= u64::try_from(ceiling).unwrap_or(u64::MAX)
	}
}

fn header_name(name: &str) -> Result<HeaderName, ConfigError> {
	HeaderName::from_bytes(name.as_bytes())
		.map_err(|_| ConfigError::InvalidHeaderName { name: name.to_owned() })
}

fn header_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Result<&'a str, RateHeaderError> {
	let value =
		headers.get(name).ok_or_else(|| RateHeaderError::Missing { header: name.to_string() })?;

	value
		.to_str()
		.map(str::trim)
		.map_err(|_| malformed(name, &String::from_utf8_lossy(value.as_bytes())))
}

fn malformed(name: &HeaderName, value: &str) -> RateHeaderError {
	RateHeaderError::Malformed { header: name.to_string(), value: value.to_owned() }
}

#[cfg(test)]
mod tests {
	// crates.io
	use ::http::HeaderValue;
	// self
	use super::*;

	fn headers(remaining: &str, reset: &str) -> HeaderMap {
		let mut map = HeaderMap::new();

		map.insert("x-ratelimit-remaining", HeaderValue::from_str(remaining).expect("valid value"));
		map.insert("x-ratelimit-reset", HeaderValue::from_str(reset).expect("valid value"));

		map
	}

	#[test]
	fn window_measures_reset_from_now() {
		let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("Fixture instant.");
		let window =
			RateWindow::from_headers(&headers("42", "1700000002.5"), &RateHeaderNames::default(), now)
				.expect("Well-formed headers should parse.");

		assert_eq!(window.remaining, 42);
		assert_eq!(window.reset_in, Duration::milliseconds(2_500));
	}

	#[test]
	fn past_reset_is_negative() {
		let now = OffsetDateTime::from_unix_timestamp(1_700_000_010).expect("Fixture instant.");
		let window =
			RateWindow::from_headers(&headers(" 3 ", "1700000000"), &RateHeaderNames::default(), now)
				.expect("Whitespace around values is tolerated.");

		assert_eq!(window.remaining, 3);
		assert!(window.reset_in.is_negative());
	}

	#[test]
	fn threshold_is_inclusive_of_the_ceiling() {
		let window = RateWindow { remaining: 10, reset_in: Duration::ZERO };

		assert!(window.is_exhausting(10));
		assert!(window.is_exhausting(11));
		assert!(!window.is_exhausting(9));
	}

	#[test]
	fn missing_and_malformed_headers_fail() {
		let names = RateHeaderNames::default();
		let now = OffsetDateTime::now_utc();
		let mut only_remaining = HeaderMap::new();

		only_remaining.insert("x-ratelimit-remaining", HeaderValue::from_static("5"));

		assert_eq!(
			RateWindow::from_headers(&only_remaining, &names, now),
			Err(RateHeaderError::Missing { header: "x-ratelimit-reset".into() })
		);
		assert_eq!(
			RateWindow::from_headers(&headers("-1", "1"), &names, now),
			Err(RateHeaderError::Malformed {
				header: "x-ratelimit-remaining".into(),
				value: "-1".into()
			})
		);
		assert_eq!(
			RateWindow::from_headers(&headers("1", "NaN"), &names, now),
			Err(RateHeaderError::Malformed { header: "x-ratelimit-reset".into(), value: "NaN".into() })
		);
	}

	#[test]
	fn custom_header_names_are_normalized() {
		let names = RateHeaderNames::new("RateLimit-Remaining", "RateLimit-Reset")
			.expect("Custom names should validate.");

		assert_eq!(names.remaining.as_str(), "ratelimit-remaining");
		assert!(RateHeaderNames::new("", "reset").is_err());
	}
}
