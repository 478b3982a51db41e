//! Document store abstraction for the Paddock admin layer.
//!
//! Admin request handlers own all I/O: they load raw documents through a
//! [`DocumentBackend`] and hand them to the core reshaping logic. This
//! crate defines that backend trait over [`bson::Document`], the option
//! and result types that go with it, and an in-process [`MemoryBackend`]
//! used by tests and local development.
//!
//! # Example
//!
//! ```rust
//! use paddock_store::{DocumentBackend, FindOptions, MemoryBackend};
//! use bson::doc;
//!
//! # async fn example() -> paddock_store::StoreResult<()> {
//! let store = MemoryBackend::new();
//! store.insert_one("authors", doc! { "name": "Jane", "articles": [] }).await?;
//!
//! let author = store.find_one("authors", doc! { "name": "Jane" }).await?;
//! assert!(author.is_some());
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod memory;
mod types;

pub use backend::DocumentBackend;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use types::{FindOptions, UpdateResult};
