//! Core data-shape logic for the Paddock admin back office.
//!
//! Request handlers load raw documents from the store, then call into this
//! crate synchronously: [`normalize`] reshapes each document into the
//! canonical JSON form, [`status`] stamps event-like records with their
//! temporal bucket, [`listing`] serves the list-screen queries, and
//! [`sync`] runs the compensating author-side write after article
//! mutations. Everything except `sync` is pure and infallible: a malformed
//! record degrades to defaults or drops out of a search, it never breaks
//! the whole list.

pub mod fields;
pub mod limits;
pub mod listing;
pub mod normalize;
pub mod status;
pub mod sync;
pub mod types;

pub use fields::FieldPath;
pub use listing::{ListPage, ListQuery, SearchField, SortDirection, paginate};
pub use normalize::{RecordShape, bson_to_json};
pub use status::EventStatus;
pub use sync::{ArticleEvent, AuthorRef, AuthorSync};
pub use types::{Article, Author, LineItem, LocalizedText};
