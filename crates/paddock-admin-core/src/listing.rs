//! List-screen queries: filter, sort, paginate.
//!
//! Every admin list screen runs the same pipeline over its normalized
//! records: free-text search ORed across the screen's search fields, a
//! single-column sort, then page slicing with metadata. Records live in
//! memory by the time this runs; the engine is pure and a single
//! malformed record can only drop itself from the results, never break
//! the list.

use std::cmp::Ordering;

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::fields::FieldPath;
use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::normalize::ticket_total;

/// Sort direction; list screens default to newest-first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}

/// A searchable column of a list screen
#[derive(Debug, Clone)]
pub enum SearchField {
	/// A stored field, resolved by dotted path
	Stored(FieldPath),
	/// The order total derived from line items at match time
	///
	/// Orders store their total separately from their tickets, so the
	/// search matches against the recomputed sum rather than trusting a
	/// stored field to exist.
	TicketTotal,
}

impl SearchField {
	/// Searchable stored field at a dotted path
	pub fn stored(path: &str) -> Self {
		Self::Stored(FieldPath::new(path))
	}
}

/// Query parameters for one list-screen request
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
	/// Free-text search; empty or whitespace matches everything
	pub search: Option<String>,
	/// Sort column; records missing it sink to the end
	pub sort_by: Option<FieldPath>,
	pub direction: SortDirection,
	/// 1-indexed page number; 0 is treated as 1
	pub page: u64,
	/// Items per page; clamped to `1..=MAX_PAGE_SIZE`, 0 means default
	pub page_size: u64,
}

impl ListQuery {
	/// Set the search needle
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = Some(search.into());
		self
	}

	/// Sort by a dotted field path
	pub fn sort_by(mut self, path: &str) -> Self {
		self.sort_by = Some(FieldPath::new(path));
		self
	}

	/// Set the sort direction
	pub fn direction(mut self, direction: SortDirection) -> Self {
		self.direction = direction;
		self
	}

	/// Set the 1-indexed page number
	pub fn page(mut self, page: u64) -> Self {
		self.page = page;
		self
	}

	/// Set the page size
	pub fn page_size(mut self, page_size: u64) -> Self {
		self.page_size = page_size;
		self
	}
}

/// One page of list results with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
	/// Records on this page
	pub results: Vec<Value>,
	/// Total records matching the search
	pub count: u64,
	/// 1-indexed page number served
	pub page: u64,
	pub page_size: u64,
	/// `ceil(count / page_size)`; 0 when nothing matched
	pub total_pages: u64,
	/// Offset of the first record on this page within the filtered set
	pub start_index: u64,
	/// One past the last record on this page
	pub end_index: u64,
}

/// Filter, sort and slice a record collection for a list screen
///
/// # Example
///
/// ```rust
/// use paddock_admin_core::listing::{ListQuery, SearchField, paginate};
/// use serde_json::json;
///
/// let records = vec![
///     json!({ "orderId": "ord-1", "customerInfo": { "fullName": "Ali Kaya" } }),
///     json!({ "orderId": "ord-2", "customerInfo": { "fullName": "Jane Doe" } }),
/// ];
/// let fields = vec![SearchField::stored("customerInfo.fullName")];
///
/// let page = paginate(&records, &fields, &ListQuery::default().with_search("jane"));
/// assert_eq!(page.count, 1);
/// assert_eq!(page.results[0]["orderId"], "ord-2");
/// ```
pub fn paginate(records: &[Value], search_fields: &[SearchField], query: &ListQuery) -> ListPage {
	let page = query.page.max(1);
	let page_size = match query.page_size {
		0 => DEFAULT_PAGE_SIZE,
		n => n.min(MAX_PAGE_SIZE),
	};

	let needle = query
		.search
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_lowercase);

	let mut matched: Vec<&Value> = match &needle {
		Some(needle) => {
			let needle_number: Option<f64> = needle.parse().ok();
			records
				.iter()
				.filter(|record| record_matches(record, search_fields, needle, needle_number))
				.collect()
		}
		None => records.iter().collect(),
	};

	if let Some(sort_field) = &query.sort_by {
		sort_records(&mut matched, sort_field, query.direction);
	}

	let count = matched.len() as u64;
	let total_pages = count.div_ceil(page_size);
	let start_index = (page - 1).saturating_mul(page_size).min(count);
	let end_index = (start_index + page_size).min(count);

	let results = matched[start_index as usize..end_index as usize]
		.iter()
		.map(|record| (*record).clone())
		.collect();

	ListPage {
		results,
		count,
		page,
		page_size,
		total_pages,
		start_index,
		end_index,
	}
}

fn record_matches(
	record: &Value,
	search_fields: &[SearchField],
	needle: &str,
	needle_number: Option<f64>,
) -> bool {
	search_fields.iter().any(|field| match field {
		SearchField::Stored(path) => path
			.resolve(record)
			.is_some_and(|value| value_matches(value, needle, needle_number)),
		SearchField::TicketTotal => {
			let total = ticket_total(record, "tickets");
			number_matches(total, needle, needle_number)
		}
	})
}

fn value_matches(value: &Value, needle: &str, needle_number: Option<f64>) -> bool {
	match value {
		Value::String(s) => s.to_lowercase().contains(needle),
		Value::Number(n) => n
			.as_f64()
			.is_some_and(|n| number_matches(n, needle, needle_number)),
		// Localized pairs match in either language
		Value::Object(map) if map.contains_key("tr") || map.contains_key("en") => {
			["tr", "en"].iter().any(|lang| {
				map.get(*lang)
					.and_then(Value::as_str)
					.is_some_and(|s| s.to_lowercase().contains(needle))
			})
		}
		Value::Array(items) => items
			.iter()
			.any(|item| value_matches(item, needle, needle_number)),
		Value::Bool(b) => if *b { "true" } else { "false" }.contains(needle),
		_ => false,
	}
}

fn number_matches(value: f64, needle: &str, needle_number: Option<f64>) -> bool {
	if needle_number.is_some_and(|n| n == value) {
		return true;
	}
	render_number(value).contains(needle)
}

fn render_number(value: f64) -> String {
	if value.fract() == 0.0 {
		format!("{}", value as i64)
	} else {
		format!("{value}")
	}
}

/// Sort key for one record; variants keep a fixed rank so mixed-type
/// collections still get a total order
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
	Instant(i64),
	Number(f64),
	Text(String),
}

impl SortKey {
	fn rank(&self) -> u8 {
		match self {
			Self::Instant(_) => 0,
			Self::Number(_) => 1,
			Self::Text(_) => 2,
		}
	}

	fn compare(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Instant(a), Self::Instant(b)) => a.cmp(b),
			(Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
			(Self::Text(a), Self::Text(b)) => a.cmp(b),
			_ => self.rank().cmp(&other.rank()),
		}
	}
}

fn sort_key(record: &Value, field: &FieldPath) -> Option<SortKey> {
	let value = field.resolve(record)?;
	match value {
		// Defaulted-to-empty fields count as missing and sink to the end
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => match DateTime::parse_from_rfc3339(s) {
			Ok(instant) => Some(SortKey::Instant(instant.timestamp_millis())),
			Err(_) => Some(SortKey::Text(s.clone())),
		},
		Value::Number(n) => n.as_f64().map(SortKey::Number),
		Value::Bool(b) => Some(SortKey::Number(f64::from(u8::from(*b)))),
		other => {
			debug!(field = %field, ?other, "unsortable value, record sinks to the end");
			None
		}
	}
}

fn sort_records(records: &mut Vec<&Value>, field: &FieldPath, direction: SortDirection) {
	let mut keyed: Vec<(Option<SortKey>, &Value)> = records
		.drain(..)
		.map(|record| (sort_key(record, field), record))
		.collect();

	// Stable sort; records without a sort key sink to the end no matter
	// the direction
	keyed.sort_by(|(a, _), (b, _)| match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Greater,
		(Some(_), None) => Ordering::Less,
		(Some(a), Some(b)) => {
			let ordering = a.compare(b);
			match direction {
				SortDirection::Asc => ordering,
				SortDirection::Desc => ordering.reverse(),
			}
		}
	});

	records.extend(keyed.into_iter().map(|(_, record)| record));
}
