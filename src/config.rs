//! Validated session configuration shared by every request a session issues.
//!
//! A [`SessionConfig`] pins the tenant, credentials, endpoint, and flow-control knobs for one
//! logical API connection. Construct it with [`SessionConfig::builder`]; the builder resolves
//! `https://{slug}.{host}/api/{version}/` unless an explicit endpoint override is supplied.

/// Builder API for assembling session configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TenantSlug},
	error::ConfigError,
	rate::RateHeaderNames,
};

/// Service host appended to the tenant slug.
pub const DEFAULT_HOST: &str = "nationbuilder.com";
/// API version segment used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v1";
/// Maximum simultaneous in-flight requests used when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 128;
/// Items requested per page by [`crate::session::Session::hydrate`].
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Immutable configuration consumed by a [`crate::session::Session`].
#[derive(Clone, Debug)]
pub struct SessionConfig {
	/// Tenant whose API is addressed.
	pub slug: TenantSlug,
	/// Token attached as `access_token` to every request.
	pub access_token: AccessToken,
	/// Base URL every request path is joined onto; always ends with `/`.
	pub endpoint: Url,
	/// Concurrency ceiling; also the proactive throttle threshold.
	pub concurrency: usize,
	/// Default page size for [`crate::session::Session::hydrate`].
	pub page_size: usize,
	/// Optional cap on pages fetched by a single walk.
	pub max_pages: Option<usize>,
	/// Per-request timeout applied by the default reqwest transport.
	pub request_timeout: Option<std::time::Duration>,
	/// Header names carrying the remaining quota and its reset instant.
	pub rate_headers: RateHeaderNames,
}
impl SessionConfig {
	/// Creates a new builder for the provided tenant and token.
	pub fn builder(slug: TenantSlug, access_token: AccessToken) -> SessionConfigBuilder {
		SessionConfigBuilder::new(slug, access_token)
	}

	/// Appends `path` under the endpoint and adds the token plus `query`, URL-encoded.
	///
	/// The token must never leave the endpoint, so absolute or scheme-relative paths and `.`/`..`
	/// segments are rejected rather than resolved.
	pub fn request_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ConfigError> {
		let invalid = || ConfigError::InvalidPath { path: path.to_owned() };

		if path.contains("://") || path.starts_with("//") || path.contains(['\\', '?', '#']) {
			return Err(invalid());
		}

		let segments = path.trim_start_matches('/').split('/');

		if segments.clone().any(|segment| matches!(segment, "." | "..")) {
			return Err(invalid());
		}

		let mut url = self.endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::OpaqueEndpoint { url: self.endpoint.to_string() })?
			.pop_if_empty()
			.extend(segments);
		url.query_pairs_mut()
			.append_pair("access_token", self.access_token.expose())
			.extend_pairs(query.iter());

		Ok(url)
	}
}
