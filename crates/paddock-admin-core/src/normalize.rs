//! Record normalization.
//!
//! The store is schema-less: documents can carry opaque BSON ids, miss
//! optional fields entirely, or hold a `totalAmount` that drifted after
//! line items were edited. List and detail screens depend on one stable
//! shape, so every document passes through a [`RecordShape`] on the way
//! out: BSON-only values become JSON-safe, expected fields get
//! type-appropriate defaults, and derived totals are recomputed from line
//! items. Normalization is pure, idempotent, and never fails — malformed
//! input degrades to defaults.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value, json};

/// Placeholder label for records missing a display name
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Convert a BSON value to its JSON-safe form
///
/// Opaque values are rendered as strings: `ObjectId` as 24-char hex,
/// `DateTime` as RFC 3339, `Binary` as base64. Applied recursively, so no
/// BSON-only value survives to a JSON boundary. BSON types with no
/// meaningful JSON rendering (`MinKey`, `Undefined`, ...) become `null`.
pub fn bson_to_json(value: &Bson) -> Value {
	match value {
		Bson::Double(n) => Value::from(*n),
		Bson::String(s) => Value::String(s.clone()),
		Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
		Bson::Document(doc) => document_to_json(doc),
		Bson::Boolean(b) => Value::Bool(*b),
		Bson::Null => Value::Null,
		Bson::Int32(n) => Value::from(*n),
		Bson::Int64(n) => Value::from(*n),
		Bson::ObjectId(oid) => Value::String(oid.to_hex()),
		Bson::DateTime(dt) => Value::String(rfc3339_millis(dt.timestamp_millis())),
		Bson::Binary(binary) => Value::String(BASE64.encode(&binary.bytes)),
		Bson::Decimal128(d) => Value::String(d.to_string()),
		Bson::Symbol(s) => Value::String(s.clone()),
		Bson::JavaScriptCode(code) => Value::String(code.clone()),
		_ => Value::Null,
	}
}

/// Convert a whole BSON document to a JSON object
pub fn document_to_json(doc: &Document) -> Value {
	let mut map = Map::with_capacity(doc.len());
	for (key, value) in doc.iter() {
		map.insert(key.clone(), bson_to_json(value));
	}
	Value::Object(map)
}

fn rfc3339_millis(timestamp_millis: i64) -> String {
	match DateTime::from_timestamp_millis(timestamp_millis) {
		Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
		None => timestamp_millis.to_string(),
	}
}

/// Expected type of a normalized field, with its defaulting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// Plain string, defaults to `""`
	Text,
	/// Display name, defaults to [`UNKNOWN_LABEL`]
	Label,
	/// Nullable string reference, defaults to `null`
	OptionalText,
	/// `{tr, en}` pair; bare strings are lifted into both languages
	Localized,
	/// Numeric field, defaults to `0`
	Number,
	/// Array of arbitrary values, defaults to `[]`
	List,
	/// Array of ticket line items, each normalized to
	/// `{id, name, price, quantity}`
	Items,
}

/// One expected field of a record shape
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
	/// Dotted path of the field within the record
	pub path: &'static str,
	pub kind: FieldKind,
}

const fn field(path: &'static str, kind: FieldKind) -> FieldSpec {
	FieldSpec { path, kind }
}

/// Static description of one admin collection's canonical shape
///
/// # Example
///
/// ```rust
/// use paddock_admin_core::normalize::RecordShape;
/// use bson::doc;
///
/// let raw = doc! {
///     "orderId": "ord-1",
///     "tickets": [ { "id": "t", "name": "Standard", "price": 100, "quantity": 2 } ],
///     "totalAmount": 999, // stale stored total
/// };
/// let record = RecordShape::EVENT_ORDER.normalize(&raw);
/// assert_eq!(record["totalAmount"], 200); // recomputed, not trusted
/// assert_eq!(record["customerInfo"]["fullName"], "Unknown");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RecordShape {
	/// Collection this shape describes
	pub collection: &'static str,
	pub fields: &'static [FieldSpec],
	/// `(line items field, total field)` — when set, the total is
	/// recomputed from the items and overwrites any stored value
	pub derived_total: Option<(&'static str, &'static str)>,
}

impl RecordShape {
	/// Event ticket orders
	pub const EVENT_ORDER: RecordShape = RecordShape {
		collection: "orders",
		fields: &[
			field("orderId", FieldKind::Text),
			field("customerInfo.fullName", FieldKind::Label),
			field("customerInfo.email", FieldKind::Text),
			field("customerInfo.phone", FieldKind::Text),
			field("date", FieldKind::Text),
			field("tickets", FieldKind::Items),
			field("totalAmount", FieldKind::Number),
		],
		derived_total: Some(("tickets", "totalAmount")),
	};

	/// Simulator session bookings
	pub const SESSION_BOOKING: RecordShape = RecordShape {
		collection: "bookings",
		fields: &[
			field("refNumber", FieldKind::Text),
			field("customerInfo.fullName", FieldKind::Label),
			field("customerInfo.phone", FieldKind::Text),
			field("date", FieldKind::Text),
			field("simulator", FieldKind::Text),
			field("durationMinutes", FieldKind::Number),
			field("totalAmount", FieldKind::Number),
		],
		derived_total: None,
	};

	/// Blog authors
	pub const AUTHOR: RecordShape = RecordShape {
		collection: "authors",
		fields: &[
			field("name", FieldKind::Label),
			field("profileImage", FieldKind::Text),
			field("articles", FieldKind::List),
			field("createdAt", FieldKind::Text),
			field("updatedAt", FieldKind::Text),
		],
		derived_total: None,
	};

	/// Blog posts
	pub const ARTICLE: RecordShape = RecordShape {
		collection: "articles",
		fields: &[
			field("slug", FieldKind::Text),
			field("author", FieldKind::OptionalText),
			field("title", FieldKind::Localized),
			field("excerpt", FieldKind::Localized),
			field("content", FieldKind::Localized),
			field("coverImage", FieldKind::Text),
			field("createdAt", FieldKind::Text),
			field("updatedAt", FieldKind::Text),
		],
		derived_total: None,
	};

	/// Normalize a raw stored document into the canonical record shape
	pub fn normalize(&self, doc: &Document) -> Value {
		self.normalize_json(document_to_json(doc))
	}

	/// Normalize an already-JSON record
	///
	/// `normalize_json(normalize_json(r)) == normalize_json(r)` for all `r`.
	pub fn normalize_json(&self, record: Value) -> Value {
		let mut record = match record {
			Value::Object(map) => Value::Object(map),
			_ => Value::Object(Map::new()),
		};

		for spec in self.fields {
			apply_field(&mut record, spec);
		}

		if let Some((items_field, total_field)) = self.derived_total {
			let total = ticket_total(&record, items_field);
			if let Some(map) = record.as_object_mut() {
				map.insert(total_field.to_string(), number(total));
			}
		}

		record
	}
}

/// Sum of `price × quantity` over a record's line items
///
/// This is the authoritative order total; stored totals can drift when
/// line items are edited separately.
pub fn ticket_total(record: &Value, items_field: &str) -> f64 {
	let Some(Value::Array(items)) = record.get(items_field) else {
		return 0.0;
	};
	items
		.iter()
		.map(|item| {
			let price = item.get("price").and_then(as_f64).unwrap_or(0.0).max(0.0);
			let quantity = item.get("quantity").and_then(as_u64).unwrap_or(0);
			price * quantity as f64
		})
		.sum()
}

fn apply_field(record: &mut Value, spec: &FieldSpec) {
	let mut current = match record.as_object_mut() {
		Some(map) => map,
		None => return,
	};

	let mut segments = spec.path.split('.').peekable();
	while let Some(segment) = segments.next() {
		if segments.peek().is_none() {
			let normalized = coerce(current.get(segment), spec.kind);
			current.insert(segment.to_string(), normalized);
			return;
		}
		// Malformed intermediates are replaced so the expected leaf exists
		if !matches!(current.get(segment), Some(Value::Object(_))) {
			current.insert(segment.to_string(), Value::Object(Map::new()));
		}
		current = match current.get_mut(segment).and_then(Value::as_object_mut) {
			Some(map) => map,
			None => return,
		};
	}
}

fn coerce(value: Option<&Value>, kind: FieldKind) -> Value {
	match kind {
		FieldKind::Text => coerce_text(value, ""),
		FieldKind::Label => coerce_text(value, UNKNOWN_LABEL),
		FieldKind::OptionalText => match value {
			Some(Value::String(s)) => Value::String(s.clone()),
			_ => Value::Null,
		},
		FieldKind::Localized => coerce_localized(value),
		FieldKind::Number => number(value.and_then(as_f64).unwrap_or(0.0)),
		FieldKind::List => match value {
			Some(Value::Array(items)) => Value::Array(items.clone()),
			_ => Value::Array(Vec::new()),
		},
		FieldKind::Items => match value {
			Some(Value::Array(items)) => {
				Value::Array(items.iter().map(normalize_line_item).collect())
			}
			_ => Value::Array(Vec::new()),
		},
	}
}

fn coerce_text(value: Option<&Value>, default: &str) -> Value {
	match value {
		Some(Value::String(s)) => Value::String(s.clone()),
		Some(Value::Number(n)) => Value::String(n.to_string()),
		_ => Value::String(default.to_string()),
	}
}

fn coerce_localized(value: Option<&Value>) -> Value {
	match value {
		Some(Value::String(s)) => json!({ "tr": s, "en": s }),
		Some(Value::Object(map)) => {
			let language = |key: &str| match map.get(key) {
				Some(Value::String(s)) => s.clone(),
				_ => String::new(),
			};
			json!({ "tr": language("tr"), "en": language("en") })
		}
		_ => json!({ "tr": "", "en": "" }),
	}
}

fn normalize_line_item(item: &Value) -> Value {
	let id = match item.get("id") {
		Some(Value::String(s)) => s.clone(),
		Some(Value::Number(n)) => n.to_string(),
		_ => String::new(),
	};
	let name = match item.get("name") {
		Some(Value::String(s)) => Value::String(s.clone()),
		Some(localized @ Value::Object(_)) => coerce_localized(Some(localized)),
		_ => Value::String(String::new()),
	};
	let price = item.get("price").and_then(as_f64).unwrap_or(0.0).max(0.0);
	let quantity = item.get("quantity").and_then(as_u64).unwrap_or(0);

	json!({ "id": id, "name": name, "price": number(price), "quantity": quantity })
}

fn as_f64(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

fn as_u64(value: &Value) -> Option<u64> {
	match value {
		Value::Number(n) => n
			.as_u64()
			.or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Render a non-negative float as the cleanest JSON number
fn number(value: f64) -> Value {
	if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
		Value::from(value as i64)
	} else {
		Value::from(value)
	}
}
