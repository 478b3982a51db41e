//! Author ↔ article referential sync.
//!
//! Articles store their owning author id; authors store the list of their
//! article slugs. The two collections are written independently and the
//! store has no cross-collection transactions, so after every article
//! write the handler fires the matching [`ArticleEvent`] here and
//! [`AuthorSync`] issues the compensating author-side write.
//!
//! The article write is the transaction of record: by the time this runs
//! it has already succeeded. A failure here is logged and swallowed —
//! callers proceed, accepting transient divergence over rolling back a
//! completed write. All membership updates are `$addToSet`/`$pull`, so
//! re-running any event is a no-op and a concurrent last-write-wins race
//! on the same author cannot duplicate slugs.

use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use tracing::{debug, warn};

use paddock_store::{DocumentBackend, StoreResult};

use crate::normalize::UNKNOWN_LABEL;

/// Reference to an author as it appears in an article payload
///
/// Create payloads usually carry only a display name; edits carry the id.
#[derive(Debug, Clone, Default)]
pub struct AuthorRef {
	pub id: Option<String>,
	pub name: Option<String>,
}

impl AuthorRef {
	/// Reference by stored id
	pub fn by_id(id: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			name: None,
		}
	}

	/// Reference by display name (matched case-insensitively)
	pub fn by_name(name: impl Into<String>) -> Self {
		Self {
			id: None,
			name: Some(name.into()),
		}
	}

	/// True when the article carries no author reference at all
	pub fn is_empty(&self) -> bool {
		self.id.is_none() && self.name.is_none()
	}
}

/// An article mutation the author side must mirror
#[derive(Debug, Clone)]
pub enum ArticleEvent {
	/// Article created under `author`
	Created { slug: String, author: AuthorRef },
	/// Article moved from `previous` to `next`
	Reassigned {
		slug: String,
		previous: AuthorRef,
		next: AuthorRef,
	},
	/// Article deleted while owned by `author`
	Deleted { slug: String, author: AuthorRef },
}

/// Best-effort coordinator for the author-side compensating write
///
/// # Example
///
/// ```rust
/// use paddock_admin_core::sync::{ArticleEvent, AuthorRef, AuthorSync};
/// use paddock_store::MemoryBackend;
/// use std::sync::Arc;
///
/// # async fn example() {
/// let sync = AuthorSync::new(Arc::new(MemoryBackend::new()));
/// sync.apply(ArticleEvent::Created {
///     slug: "race-night-recap".to_string(),
///     author: AuthorRef::by_name("Jane"),
/// })
/// .await;
/// # }
/// ```
pub struct AuthorSync {
	store: Arc<dyn DocumentBackend>,
	collection: String,
}

impl AuthorSync {
	/// Coordinator over the default `authors` collection
	pub fn new(store: Arc<dyn DocumentBackend>) -> Self {
		Self {
			store,
			collection: "authors".to_string(),
		}
	}

	/// Use a non-default authors collection
	pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
		self.collection = collection.into();
		self
	}

	/// Mirror one article mutation onto the author collection
	///
	/// Never fails: each store error is logged as a warning and dropped.
	/// On reassignment both writes are attempted even if the first fails.
	pub async fn apply(&self, event: ArticleEvent) {
		match event {
			ArticleEvent::Created { slug, author } => {
				if let Err(err) = self.attach(&slug, &author).await {
					warn!(slug, error = %err, "author sync failed to attach new article");
				}
			}
			ArticleEvent::Reassigned {
				slug,
				previous,
				next,
			} => {
				if let Err(err) = self.detach(&slug, &previous).await {
					warn!(slug, error = %err, "author sync failed to detach from previous author");
				}
				if let Err(err) = self.attach(&slug, &next).await {
					warn!(slug, error = %err, "author sync failed to attach to new author");
				}
			}
			ArticleEvent::Deleted { slug, author } => {
				if let Err(err) = self.detach(&slug, &author).await {
					warn!(slug, error = %err, "author sync failed to detach deleted article");
				}
			}
		}
	}

	/// Add the slug to the referenced author, creating the author if the
	/// reference matches nothing
	async fn attach(&self, slug: &str, author: &AuthorRef) -> StoreResult<()> {
		let Some(filter) = author_filter(author) else {
			debug!(slug, "article has no author reference, nothing to mirror");
			return Ok(());
		};

		let update = doc! {
			"$addToSet": { "articles": slug },
			"$set": { "updatedAt": bson::DateTime::now() },
		};
		let result = self
			.store
			.update_one(&self.collection, filter, update)
			.await?;

		if result.is_miss() {
			let now = bson::DateTime::now();
			let mut document = doc! {
				"name": author.name.as_deref().unwrap_or(UNKNOWN_LABEL),
				"profileImage": "",
				"articles": [slug],
				"createdAt": now,
				"updatedAt": now,
			};
			if let Some(id) = &author.id {
				document.insert("_id", id_value(id));
			}
			let id = self.store.insert_one(&self.collection, document).await?;
			debug!(slug, author_id = %id, "created author for new article");
		}
		Ok(())
	}

	/// Remove the slug from the referenced author; a second run is a no-op
	async fn detach(&self, slug: &str, author: &AuthorRef) -> StoreResult<()> {
		let Some(filter) = author_filter(author) else {
			return Ok(());
		};

		let update = doc! {
			"$pull": { "articles": slug },
			"$set": { "updatedAt": bson::DateTime::now() },
		};
		self.store
			.update_one(&self.collection, filter, update)
			.await?;
		Ok(())
	}
}

/// Build the author lookup filter: by id when the payload has one,
/// otherwise by case-insensitive exact name
fn author_filter(author: &AuthorRef) -> Option<Document> {
	if let Some(id) = &author.id {
		return Some(doc! { "_id": id_value(id) });
	}
	let name = author.name.as_deref()?;
	Some(doc! {
		"name": { "$regex": format!("^{}$", regex::escape(name)), "$options": "i" }
	})
}

/// Author ids round-trip through JSON as hex strings; stored `_id`s are
/// ObjectIds when the store generated them
fn id_value(id: &str) -> Bson {
	match ObjectId::parse_str(id) {
		Ok(oid) => Bson::ObjectId(oid),
		Err(_) => Bson::String(id.to_string()),
	}
}
