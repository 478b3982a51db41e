//! Document-oriented store trait.
//!
//! The admin layer never talks to a concrete database: request handlers
//! supply an implementation of [`DocumentBackend`] (a MongoDB client
//! wrapper in production, [`crate::MemoryBackend`] in tests).

use async_trait::async_trait;
use bson::Document;

use crate::error::StoreResult;
use crate::types::{FindOptions, UpdateResult};

/// Trait for document-oriented stores
///
/// Documents are semi-structured [`bson::Document`] values addressed by
/// collection name. Filters and updates use MongoDB operator syntax;
/// implementations only need the subset the admin layer issues (direct
/// equality, dotted paths, `$regex`/`$options`, and the `$set`, `$push`,
/// `$addToSet`, `$pull` update operators).
///
/// # Example
///
/// ```rust,ignore
/// use paddock_store::DocumentBackend;
/// use bson::doc;
///
/// async fn find_author(db: &dyn DocumentBackend, name: &str) -> paddock_store::StoreResult<Option<bson::Document>> {
///     db.find_one("authors", doc! { "name": name }).await
/// }
/// ```
#[async_trait]
pub trait DocumentBackend: Send + Sync {
	/// Finds a single document matching the filter
	///
	/// Returns `Some(Document)` for the first match in store order,
	/// `None` otherwise.
	async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>>;

	/// Finds all documents matching the filter
	///
	/// # Example
	///
	/// ```rust,ignore
	/// let options = FindOptions::new().limit(10).sort(doc! { "createdAt": -1 });
	/// let orders = db.find_many("orders", doc! {}, options).await?;
	/// ```
	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> StoreResult<Vec<Document>>;

	/// Inserts a single document into the collection
	///
	/// An `_id` is generated when the document does not carry one.
	/// Returns the id of the inserted document in string form.
	async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<String>;

	/// Updates the first document matching the filter
	///
	/// # Example
	///
	/// ```rust,ignore
	/// let result = db.update_one(
	///     "authors",
	///     doc! { "name": "Jane" },
	///     doc! { "$addToSet": { "articles": "post-2" } },
	/// ).await?;
	/// ```
	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> StoreResult<UpdateResult>;

	/// Deletes the first document matching the filter
	///
	/// Returns the number of documents deleted (0 or 1).
	async fn delete_one(&self, collection: &str, filter: Document) -> StoreResult<u64>;
}
