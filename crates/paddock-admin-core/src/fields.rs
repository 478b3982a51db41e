//! Dotted field paths over dynamic records.
//!
//! List screens name their searchable and sortable columns as dotted
//! strings (`"customerInfo.fullName"`). `FieldPath` is the one primitive
//! the rest of the crate uses to read such a field from a record whose
//! location is only known at call time.

use serde_json::Value;

/// A parsed dotted field path
///
/// # Example
///
/// ```rust
/// use paddock_admin_core::fields::FieldPath;
/// use serde_json::json;
///
/// let record = json!({ "customerInfo": { "fullName": "Ali Kaya" } });
/// let path = FieldPath::new("customerInfo.fullName");
/// assert_eq!(path.resolve(&record), Some(&json!("Ali Kaya")));
/// assert_eq!(FieldPath::new("customerInfo.phone").resolve(&record), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
	segments: Vec<String>,
}

impl FieldPath {
	/// Parse a dotted path
	pub fn new(path: &str) -> Self {
		Self {
			segments: path.split('.').map(str::to_string).collect(),
		}
	}

	/// The path segments in order
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// Render the path back to its dotted form
	pub fn dotted(&self) -> String {
		self.segments.join(".")
	}

	/// Resolve the path against a record
	///
	/// Walks one segment at a time and gives up with `None` as soon as an
	/// intermediate value is missing, `null`, or not an object. No side
	/// effects, never panics.
	pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
		let mut current = record;
		for segment in &self.segments {
			current = current.as_object()?.get(segment)?;
			if current.is_null() {
				return None;
			}
		}
		Some(current)
	}
}

impl From<&str> for FieldPath {
	fn from(path: &str) -> Self {
		Self::new(path)
	}
}

impl std::fmt::Display for FieldPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.dotted())
	}
}
