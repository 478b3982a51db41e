//! Common types shared by document store backends.

use bson::Document;

/// Options for `find_many` queries
///
/// # Example
///
/// ```rust
/// use paddock_store::FindOptions;
/// use bson::doc;
///
/// let options = FindOptions::new()
///     .limit(25)
///     .skip(50)
///     .sort(doc! { "createdAt": -1 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
	/// Maximum number of documents to return
	pub limit: Option<u64>,
	/// Number of matching documents to skip
	pub skip: Option<u64>,
	/// Sort specification (field name to 1 ascending / -1 descending)
	pub sort: Option<Document>,
}

impl FindOptions {
	/// Create empty options (no limit, no skip, store order)
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the maximum number of documents to return
	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	/// Set the number of matching documents to skip
	pub fn skip(mut self, skip: u64) -> Self {
		self.skip = Some(skip);
		self
	}

	/// Set the sort specification
	pub fn sort(mut self, sort: Document) -> Self {
		self.sort = Some(sort);
		self
	}
}

/// Outcome of an `update_one` operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
	/// Number of documents matched by the filter (0 or 1)
	pub matched_count: u64,
	/// Number of documents actually modified
	pub modified_count: u64,
}

impl UpdateResult {
	/// True if the filter matched no document
	pub fn is_miss(&self) -> bool {
		self.matched_count == 0
	}
}
