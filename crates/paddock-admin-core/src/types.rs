//! Typed views of the admin collections.
//!
//! Records travel through the layer as dynamic `serde_json::Value`s (list
//! screens are heterogeneous), but the shapes the normalizer guarantees
//! are stable enough to deserialize into these structs at the seams that
//! want them.

use serde::{Deserialize, Serialize};

/// The same text in both site languages
///
/// Stored documents carry localized fields as `{tr, en}` objects; the
/// normalizer guarantees both keys exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
	pub tr: String,
	pub en: String,
}

impl LocalizedText {
	/// Same value in both languages
	pub fn uniform(text: impl Into<String>) -> Self {
		let text = text.into();
		Self {
			tr: text.clone(),
			en: text,
		}
	}
}

/// A ticket line item contributing to an order's total
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
	pub id: String,
	/// Ticket label; legacy documents store a bare string, newer ones a
	/// localized pair, so this stays dynamic
	pub name: serde_json::Value,
	pub price: f64,
	pub quantity: u64,
}

impl LineItem {
	/// This line's contribution to the order total
	pub fn subtotal(&self) -> f64 {
		self.price * self.quantity as f64
	}
}

/// A blog author
///
/// `articles` mirrors `Article::author` and is maintained by
/// [`crate::sync::AuthorSync`], not by author CRUD itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
	#[serde(rename = "_id")]
	pub id: String,
	pub name: String,
	pub profile_image: String,
	/// Slugs of this author's articles, in publication order
	pub articles: Vec<String>,
	pub created_at: String,
	pub updated_at: String,
}

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
	/// Unique, immutable after creation
	pub slug: String,
	/// Owning author id; articles can be authorless
	pub author: Option<String>,
	pub title: LocalizedText,
	pub excerpt: LocalizedText,
	pub content: LocalizedText,
	pub cover_image: String,
	pub created_at: String,
	pub updated_at: String,
}
