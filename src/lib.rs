//! Quota-aware async REST session for tenant APIs: bounded concurrency, single-sleeper throttling
//! driven by rate-limit headers, and cursor pagination flattened into one lazy sequence.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod limiter;
pub mod obs;
pub mod rate;
pub mod session;
pub mod throttle;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AccessToken, TenantSlug},
		config::SessionConfig,
	};

	/// Builds a configuration that points at a loopback endpoint such as an `httpmock` server.
	pub fn test_config(endpoint: &str, concurrency: usize) -> SessionConfig {
		let slug = TenantSlug::new("test-nation").expect("Test tenant slug should be valid.");
		let endpoint = Url::parse(endpoint).expect("Test endpoint should parse.");

		SessionConfig::builder(slug, AccessToken::new("test-token"))
			.endpoint(endpoint)
			.concurrency(concurrency)
			.build()
			.expect("Test configuration should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http::Method;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use httpmock as _;
