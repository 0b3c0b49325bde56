// self
use crate::_prelude::*;

/// Caller-supplied query parameters appended after `access_token`, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);
impl Query {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a parameter, returning the updated list.
	pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
		self.push(key, value);

		self
	}

	/// Appends a parameter in place.
	pub fn push(&mut self, key: impl Into<String>, value: impl Display) {
		self.0.push((key.into(), value.to_string()));
	}

	/// Appends every parameter of `other`.
	pub fn extend_from(&mut self, other: &Query) {
		self.0.extend_from_slice(&other.0);
	}

	/// Returns the parameters as key/value pairs.
	pub fn as_slice(&self) -> &[(String, String)] {
		&self.0
	}

	/// Whether no parameters were added.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for Query
where
	K: Into<String>,
	V: Display,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut query = Self::new();

		for (key, value) in iter {
			query.push(key, value);
		}

		query
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parameters_keep_insertion_order() {
		let query = Query::new().with("state_file_id", "NY000000000000000001").with("limit", 5);

		assert_eq!(
			query.as_slice(),
			[
				("state_file_id".to_owned(), "NY000000000000000001".to_owned()),
				("limit".to_owned(), "5".to_owned()),
			]
		);
		assert_eq!(Query::from_iter([("a", 1), ("b", 2)]).as_slice().len(), 2);
		assert!(Query::new().is_empty());
	}
}
