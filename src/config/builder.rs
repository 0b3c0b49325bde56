// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TenantSlug},
	config::{DEFAULT_API_VERSION, DEFAULT_CONCURRENCY, DEFAULT_HOST, DEFAULT_PAGE_SIZE, SessionConfig},
	error::ConfigError,
	rate::{RATE_REMAINING_HEADER, RATE_RESET_HEADER, RateHeaderNames},
};

/// Builder for [`SessionConfig`] values.
#[derive(Debug)]
pub struct SessionConfigBuilder {
	/// Tenant whose API is addressed.
	pub slug: TenantSlug,
	/// Token attached to every request.
	pub access_token: AccessToken,
	/// Service host the slug is prefixed onto.
	pub host: String,
	/// API version path segment.
	pub api_version: String,
	/// Explicit base URL replacing the slug/host/version template.
	pub endpoint: Option<Url>,
	/// Concurrency ceiling.
	pub concurrency: usize,
	/// Default page size for hydrating listings.
	pub page_size: usize,
	/// Optional cap on pages fetched by one walk.
	pub max_pages: Option<usize>,
	/// Optional per-request timeout.
	pub request_timeout: Option<std::time::Duration>,
	/// Header carrying the remaining quota.
	pub remaining_header: String,
	/// Header carrying the quota reset instant.
	pub reset_header: String,
}
impl SessionConfigBuilder {
	/// Creates a new builder seeded with the service defaults.
	pub fn new(slug: TenantSlug, access_token: AccessToken) -> Self {
		Self {
			slug,
			access_token,
			host: DEFAULT_HOST.into(),
			api_version: DEFAULT_API_VERSION.into(),
			endpoint: None,
			concurrency: DEFAULT_CONCURRENCY,
			page_size: DEFAULT_PAGE_SIZE,
			max_pages: None,
			request_timeout: None,
			remaining_header: RATE_REMAINING_HEADER.into(),
			reset_header: RATE_RESET_HEADER.into(),
		}
	}

	/// Overrides the service host (defaults to `nationbuilder.com`).
	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();

		self
	}

	/// Overrides the API version segment (defaults to `v1`).
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();

		self
	}

	/// Uses `url` as the base for every request instead of the slug/host template.
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Sets the concurrency ceiling (defaults to 128).
	pub fn concurrency(mut self, ceiling: usize) -> Self {
		self.concurrency = ceiling;

		self
	}

	/// Sets the page size used by `hydrate` (defaults to 100).
	pub fn page_size(mut self, size: usize) -> Self {
		self.page_size = size;

		self
	}

	/// Caps the number of pages a single walk may fetch.
	pub fn max_pages(mut self, max: usize) -> Self {
		self.max_pages = Some(max);

		self
	}

	/// Applies a timeout to every request sent by the default transport.
	pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Overrides the header names carrying the remaining quota and reset instant.
	pub fn rate_headers(mut self, remaining: impl Into<String>, reset: impl Into<String>) -> Self {
		self.remaining_header = remaining.into();
		self.reset_header = reset.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfig, ConfigError> {
		if self.concurrency == 0 {
			return Err(ConfigError::ZeroConcurrency);
		}
		if self.page_size == 0 {
			return Err(ConfigError::ZeroPageSize);
		}

		let endpoint = match self.endpoint {
			Some(url) => url,
			None => {
				let raw = format!(
					"https://{}.{}/api/{}/",
					self.slug,
					self.host.trim_matches('.'),
					self.api_version.trim_matches('/')
				);

				Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { source })?
			},
		};
		let endpoint = validate_endpoint(endpoint)?;
		let rate_headers = RateHeaderNames::new(&self.remaining_header, &self.reset_header)?;

		Ok(SessionConfig {
			slug: self.slug,
			access_token: self.access_token,
			endpoint,
			concurrency: self.concurrency,
			page_size: self.page_size,
			max_pages: self.max_pages,
			request_timeout: self.request_timeout,
			rate_headers,
		})
	}
}

fn validate_endpoint(mut url: Url) -> Result<Url, ConfigError> {
	if url.cannot_be_a_base() {
		return Err(ConfigError::OpaqueEndpoint { url: url.to_string() });
	}

	let secure = match url.scheme() {
		"https" => true,
		"http" => is_loopback(url.host()),
		_ => false,
	};

	if !secure {
		return Err(ConfigError::InsecureEndpoint { url: url.to_string() });
	}
	// Paths join relative to the last segment, so the base must end in a slash.
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);

	Ok(url)
}

fn is_loopback(host: Option<Host<&str>>) -> bool {
	match host {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> SessionConfigBuilder {
		let slug = TenantSlug::new("nation").expect("Slug fixture should be valid.");

		SessionConfig::builder(slug, AccessToken::new("token"))
	}

	#[test]
	fn defaults_template_the_tenant_host() {
		let config = builder().build().expect("Default configuration should build.");

		assert_eq!(config.endpoint.as_str(), "https://nation.nationbuilder.com/api/v1/");
		assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
		assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
		assert_eq!(config.max_pages, None);
		assert_eq!(config.rate_headers.remaining.as_str(), "x-ratelimit-remaining");
		assert_eq!(config.rate_headers.reset.as_str(), "x-ratelimit-reset");
	}

	#[test]
	fn host_and_version_overrides_apply() {
		let config = builder()
			.host("example.org")
			.api_version("/v2/")
			.build()
			.expect("Overridden configuration should build.");

		assert_eq!(config.endpoint.as_str(), "https://nation.example.org/api/v2/");
	}

	#[test]
	fn endpoint_override_gains_trailing_slash() {
		let config = builder()
			.endpoint(Url::parse("http://127.0.0.1:8080/api/v1?x=1").expect("Fixture URL parses."))
			.build()
			.expect("Loopback endpoint should be accepted.");

		assert_eq!(config.endpoint.as_str(), "http://127.0.0.1:8080/api/v1/");
	}

	#[test]
	fn rejects_insecure_and_degenerate_settings() {
		let err = builder()
			.endpoint(Url::parse("http://example.com/api/v1/").expect("Fixture URL parses."))
			.build()
			.expect_err("Plain HTTP to a remote host must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));

		let err = builder()
			.endpoint(Url::parse("mailto:ops@example.com").expect("Fixture URL parses."))
			.build()
			.expect_err("Opaque URLs cannot serve as a base.");

		assert!(matches!(err, ConfigError::OpaqueEndpoint { .. }));
		assert!(matches!(builder().concurrency(0).build(), Err(ConfigError::ZeroConcurrency)));
		assert!(matches!(builder().page_size(0).build(), Err(ConfigError::ZeroPageSize)));
		assert!(matches!(
			builder().rate_headers("bad header", "x-reset").build(),
			Err(ConfigError::InvalidHeaderName { .. })
		));
	}
}
