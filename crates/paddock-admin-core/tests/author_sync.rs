//! End-to-end author sync scenarios against the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bson::{Document, doc};

use paddock_admin_core::sync::{ArticleEvent, AuthorRef, AuthorSync};
use paddock_store::{
	DocumentBackend, FindOptions, MemoryBackend, StoreError, StoreResult, UpdateResult,
};

fn article_slugs(author: &Document) -> Vec<String> {
	author
		.get_array("articles")
		.unwrap()
		.iter()
		.map(|slug| slug.as_str().unwrap().to_string())
		.collect()
}

#[tokio::test]
async fn creating_an_article_appends_to_existing_author() {
	let store = Arc::new(MemoryBackend::new());
	let id = store
		.insert_one("authors", doc! { "name": "Jane Doe", "articles": ["post-1"] })
		.await
		.unwrap();

	let sync = AuthorSync::new(store.clone());
	sync.apply(ArticleEvent::Created {
		slug: "post-2".to_string(),
		author: AuthorRef::by_id(&id),
	})
	.await;

	let author = store
		.find_one("authors", doc! { "name": "Jane Doe" })
		.await
		.unwrap()
		.unwrap();
	assert_eq!(article_slugs(&author), vec!["post-1", "post-2"]);
	assert_eq!(store.len("authors"), 1);
}

#[tokio::test]
async fn unknown_author_name_is_created_with_the_article() {
	let store = Arc::new(MemoryBackend::new());
	let sync = AuthorSync::new(store.clone());

	sync.apply(ArticleEvent::Created {
		slug: "post-2".to_string(),
		author: AuthorRef::by_name("Jane"),
	})
	.await;

	let author = store
		.find_one("authors", doc! { "name": "Jane" })
		.await
		.unwrap()
		.unwrap();
	assert_eq!(article_slugs(&author), vec!["post-2"]);
	assert_eq!(author.get_str("profileImage").unwrap(), "");
	assert!(author.get_datetime("createdAt").is_ok());
	assert!(author.get_datetime("updatedAt").is_ok());
}

#[tokio::test]
async fn author_names_match_case_insensitively() {
	let store = Arc::new(MemoryBackend::new());
	store
		.insert_one("authors", doc! { "name": "Jane Doe", "articles": [] })
		.await
		.unwrap();

	let sync = AuthorSync::new(store.clone());
	sync.apply(ArticleEvent::Created {
		slug: "post-1".to_string(),
		author: AuthorRef::by_name("jane doe"),
	})
	.await;

	// Matched the existing author instead of creating a duplicate
	assert_eq!(store.len("authors"), 1);
	let author = store
		.find_one("authors", doc! { "name": "Jane Doe" })
		.await
		.unwrap()
		.unwrap();
	assert_eq!(article_slugs(&author), vec!["post-1"]);
}

#[tokio::test]
async fn reassignment_moves_the_slug_between_authors() {
	let store = Arc::new(MemoryBackend::new());
	store
		.insert_one("authors", doc! { "name": "Ayla", "articles": ["post-1"] })
		.await
		.unwrap();
	store
		.insert_one("authors", doc! { "name": "Baran", "articles": [] })
		.await
		.unwrap();

	let sync = AuthorSync::new(store.clone());
	sync.apply(ArticleEvent::Reassigned {
		slug: "post-1".to_string(),
		previous: AuthorRef::by_name("Ayla"),
		next: AuthorRef::by_name("Baran"),
	})
	.await;

	let ayla = store
		.find_one("authors", doc! { "name": "Ayla" })
		.await
		.unwrap()
		.unwrap();
	let baran = store
		.find_one("authors", doc! { "name": "Baran" })
		.await
		.unwrap()
		.unwrap();
	assert!(article_slugs(&ayla).is_empty());
	assert_eq!(article_slugs(&baran), vec!["post-1"]);
}

#[tokio::test]
async fn replayed_events_are_idempotent() {
	let store = Arc::new(MemoryBackend::new());
	store
		.insert_one("authors", doc! { "name": "Jane", "articles": ["post-1"] })
		.await
		.unwrap();
	let sync = AuthorSync::new(store.clone());

	let delete = ArticleEvent::Deleted {
		slug: "post-1".to_string(),
		author: AuthorRef::by_name("Jane"),
	};
	sync.apply(delete.clone()).await;
	sync.apply(delete).await;

	let author = store
		.find_one("authors", doc! { "name": "Jane" })
		.await
		.unwrap()
		.unwrap();
	assert!(article_slugs(&author).is_empty());

	let create = ArticleEvent::Created {
		slug: "post-1".to_string(),
		author: AuthorRef::by_name("Jane"),
	};
	sync.apply(create.clone()).await;
	sync.apply(create).await;

	let author = store
		.find_one("authors", doc! { "name": "Jane" })
		.await
		.unwrap()
		.unwrap();
	assert_eq!(article_slugs(&author), vec!["post-1"]);
}

#[tokio::test]
async fn authorless_article_touches_nothing() {
	let store = Arc::new(MemoryBackend::new());
	let sync = AuthorSync::new(store.clone());

	sync.apply(ArticleEvent::Created {
		slug: "post-1".to_string(),
		author: AuthorRef::default(),
	})
	.await;
	sync.apply(ArticleEvent::Deleted {
		slug: "post-1".to_string(),
		author: AuthorRef::default(),
	})
	.await;

	assert!(store.is_empty("authors"));
}

/// Wraps a real store and fails every update while counting the attempts
struct FlakyStore {
	inner: MemoryBackend,
	fail_updates: AtomicBool,
	update_attempts: AtomicUsize,
}

impl FlakyStore {
	fn new(inner: MemoryBackend) -> Self {
		Self {
			inner,
			fail_updates: AtomicBool::new(true),
			update_attempts: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl DocumentBackend for FlakyStore {
	async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
		self.inner.find_one(collection, filter).await
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> StoreResult<Vec<Document>> {
		self.inner.find_many(collection, filter, options).await
	}

	async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<String> {
		self.inner.insert_one(collection, document).await
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> StoreResult<UpdateResult> {
		self.update_attempts.fetch_add(1, Ordering::SeqCst);
		if self.fail_updates.load(Ordering::SeqCst) {
			return Err(StoreError::Connection("connection reset".to_string()));
		}
		self.inner.update_one(collection, filter, update).await
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> StoreResult<u64> {
		self.inner.delete_one(collection, filter).await
	}
}

#[tokio::test]
async fn reassignment_attempts_both_writes_even_when_the_first_fails() {
	let store = Arc::new(FlakyStore::new(MemoryBackend::new()));
	store
		.inner
		.insert_one("authors", doc! { "name": "Ayla", "articles": ["post-1"] })
		.await
		.unwrap();
	store
		.inner
		.insert_one("authors", doc! { "name": "Baran", "articles": [] })
		.await
		.unwrap();

	let sync = AuthorSync::new(store.clone());
	sync.apply(ArticleEvent::Reassigned {
		slug: "post-1".to_string(),
		previous: AuthorRef::by_name("Ayla"),
		next: AuthorRef::by_name("Baran"),
	})
	.await;

	// Detach failed, but attach was still attempted
	assert_eq!(store.update_attempts.load(Ordering::SeqCst), 2);

	// Once the store recovers, replaying the event converges
	store.fail_updates.store(false, Ordering::SeqCst);
	sync.apply(ArticleEvent::Reassigned {
		slug: "post-1".to_string(),
		previous: AuthorRef::by_name("Ayla"),
		next: AuthorRef::by_name("Baran"),
	})
	.await;

	let ayla = store
		.inner
		.find_one("authors", doc! { "name": "Ayla" })
		.await
		.unwrap()
		.unwrap();
	let baran = store
		.inner
		.find_one("authors", doc! { "name": "Baran" })
		.await
		.unwrap()
		.unwrap();
	assert!(article_slugs(&ayla).is_empty());
	assert_eq!(article_slugs(&baran), vec!["post-1"]);
}
