//! # Paddock
//!
//! Admin data-access and consistency layer for the Paddock venue/events
//! back office. The marketing site and the admin UI talk to a document
//! store through thin request handlers; everything with real data-shape
//! invariants lives here:
//!
//! - [`admin::normalize`] — raw stored documents into a stable, JSON-safe
//!   shape with recomputed derived totals
//! - [`admin::status`] — temporal bucketing of events relative to "now"
//! - [`admin::listing`] — generic search/sort/paginate over heterogeneous
//!   record collections
//! - [`admin::sync`] — best-effort mirroring of the author↔article
//!   reference across two collections
//! - [`store`] — the Mongo-style document backend abstraction those
//!   handlers hand in
//!
//! ## Example
//!
//! ```rust
//! use paddock::admin::listing::{ListQuery, SearchField, paginate};
//! use serde_json::json;
//!
//! let records = vec![json!({"orderId": "ord-1", "customerInfo": {"fullName": "Ayşe Demir"}})];
//! let fields = vec![SearchField::stored("customerInfo.fullName")];
//! let query = ListQuery::default().with_search("ayşe");
//! let page = paginate(&records, &fields, &query);
//! assert_eq!(page.count, 1);
//! ```

pub use paddock_admin_core as admin;
pub use paddock_store as store;
