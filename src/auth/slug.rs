//! Validated tenant slug, the DNS label that selects a tenant's API host.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const SLUG_MAX_LEN: usize = 63;

/// Error returned when tenant slug validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SlugError {
	/// The slug was empty.
	#[error("Tenant slug cannot be empty.")]
	Empty,
	/// The slug contains a character that cannot appear in a host label.
	#[error("Tenant slug contains the invalid character {found:?}.")]
	InvalidCharacter {
		/// First offending character.
		found: char,
	},
	/// The slug starts or ends with a hyphen.
	#[error("Tenant slug cannot start or end with a hyphen.")]
	EdgeHyphen,
	/// The slug exceeded the DNS label length.
	#[error("Tenant slug exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Tenant identifier templated into `https://{slug}.{host}`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantSlug(String);
impl TenantSlug {
	/// Creates a new slug after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SlugError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for TenantSlug {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for TenantSlug {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for TenantSlug {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<TenantSlug> for String {
	fn from(value: TenantSlug) -> Self {
		value.0
	}
}
impl TryFrom<String> for TenantSlug {
	type Error = SlugError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for TenantSlug {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Tenant({})", self.0)
	}
}
impl Display for TenantSlug {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for TenantSlug {
	type Err = SlugError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), SlugError> {
	if view.is_empty() {
		return Err(SlugError::Empty);
	}
	if let Some(found) =
		view.chars().find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
	{
		return Err(SlugError::InvalidCharacter { found });
	}
	if view.starts_with('-') || view.ends_with('-') {
		return Err(SlugError::EdgeHyphen);
	}
	if view.len() > SLUG_MAX_LEN {
		return Err(SlugError::TooLong { max: SLUG_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn slugs_reject_host_breaking_input() {
		assert_eq!(TenantSlug::new(""), Err(SlugError::Empty));
		assert_eq!(TenantSlug::new(" nation"), Err(SlugError::InvalidCharacter { found: ' ' }));
		assert_eq!(TenantSlug::new("evil.com/x"), Err(SlugError::InvalidCharacter { found: '.' }));
		assert_eq!(TenantSlug::new("-nation"), Err(SlugError::EdgeHyphen));
		assert_eq!(TenantSlug::new("Nation"), Err(SlugError::InvalidCharacter { found: 'N' }));

		let slug = TenantSlug::new("wilt-for-congress").expect("Slug fixture should be valid.");

		assert_eq!(slug.as_ref(), "wilt-for-congress");
	}

	#[test]
	fn length_limit_matches_dns_label() {
		TenantSlug::new("a".repeat(SLUG_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			TenantSlug::new("a".repeat(SLUG_MAX_LEN + 1)),
			Err(SlugError::TooLong { max: SLUG_MAX_LEN })
		);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let slug: TenantSlug =
			serde_json::from_str("\"nation42\"").expect("Slug should deserialize successfully.");

		assert_eq!(slug.as_ref(), "nation42");
		assert!(serde_json::from_str::<TenantSlug>("\"with space\"").is_err());
	}
}
