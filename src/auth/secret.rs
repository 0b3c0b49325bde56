//! Access token wrapper that redacts sensitive material.

// std
use std::env;
// self
use crate::_prelude::*;

/// Environment variable consulted by [`AccessToken::from_env`].
pub const ACCESS_TOKEN_ENV: &str = "NB_TOKEN";

/// Redacted API access token keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Reads the token from [`ACCESS_TOKEN_ENV`], returning `None` when unset or empty.
	pub fn from_env() -> Option<Self> {
		env::var(ACCESS_TOKEN_ENV).ok().filter(|value| !value.is_empty()).map(Self)
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
