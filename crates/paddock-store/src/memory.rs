//! In-process document store.
//!
//! `MemoryBackend` implements [`DocumentBackend`] over a plain map of
//! collections. It supports exactly the filter and update subset the admin
//! layer issues; anything else is rejected with
//! [`StoreError::Unsupported`] instead of silently matching nothing.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use parking_lot::RwLock;
use regex::Regex;
use tracing::debug;

use crate::backend::DocumentBackend;
use crate::error::{StoreError, StoreResult};
use crate::types::{FindOptions, UpdateResult};

/// In-memory document store for tests and local development
///
/// Collections are created lazily on first insert. All operations take the
/// whole-store lock; this backend is for request-handler tests, not load.
#[derive(Debug, Default)]
pub struct MemoryBackend {
	collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryBackend {
	/// Create an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of documents currently held by a collection
	pub fn len(&self, collection: &str) -> usize {
		self.collections
			.read()
			.get(collection)
			.map(Vec::len)
			.unwrap_or(0)
	}

	/// True if the collection is absent or empty
	pub fn is_empty(&self, collection: &str) -> bool {
		self.len(collection) == 0
	}
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
	async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
		let collections = self.collections.read();
		let Some(docs) = collections.get(collection) else {
			return Ok(None);
		};
		for doc in docs {
			if matches_filter(doc, &filter)? {
				return Ok(Some(doc.clone()));
			}
		}
		Ok(None)
	}

	async fn find_many(
		&self,
		collection: &str,
		filter: Document,
		options: FindOptions,
	) -> StoreResult<Vec<Document>> {
		let collections = self.collections.read();
		let Some(docs) = collections.get(collection) else {
			return Ok(Vec::new());
		};

		let mut matched = Vec::new();
		for doc in docs {
			if matches_filter(doc, &filter)? {
				matched.push(doc.clone());
			}
		}

		if let Some(sort) = &options.sort {
			for (field, order) in sort.iter().collect::<Vec<_>>().into_iter().rev() {
				let descending = bson_to_i64(order).unwrap_or(1) < 0;
				matched.sort_by(|a, b| {
					let ordering = compare_bson(get_path(a, field), get_path(b, field));
					if descending { ordering.reverse() } else { ordering }
				});
			}
		}

		let skip = options.skip.unwrap_or(0) as usize;
		let matched: Vec<Document> = matched.into_iter().skip(skip).collect();
		let matched = match options.limit {
			Some(limit) => matched.into_iter().take(limit as usize).collect(),
			None => matched,
		};

		Ok(matched)
	}

	async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<String> {
		if !document.contains_key("_id") {
			document.insert("_id", Bson::ObjectId(ObjectId::new()));
		}
		let id = id_string(document.get("_id"));

		let mut collections = self.collections.write();
		collections
			.entry(collection.to_string())
			.or_default()
			.push(document);
		debug!(collection, id = %id, "inserted document");
		Ok(id)
	}

	async fn update_one(
		&self,
		collection: &str,
		filter: Document,
		update: Document,
	) -> StoreResult<UpdateResult> {
		let mut collections = self.collections.write();
		let Some(docs) = collections.get_mut(collection) else {
			return Ok(UpdateResult {
				matched_count: 0,
				modified_count: 0,
			});
		};

		for doc in docs.iter_mut() {
			if matches_filter(doc, &filter)? {
				let modified = apply_update(doc, &update)?;
				debug!(collection, modified, "updated document");
				return Ok(UpdateResult {
					matched_count: 1,
					modified_count: u64::from(modified),
				});
			}
		}

		Ok(UpdateResult {
			matched_count: 0,
			modified_count: 0,
		})
	}

	async fn delete_one(&self, collection: &str, filter: Document) -> StoreResult<u64> {
		let mut collections = self.collections.write();
		let Some(docs) = collections.get_mut(collection) else {
			return Ok(0);
		};

		for (index, doc) in docs.iter().enumerate() {
			if matches_filter(doc, &filter)? {
				docs.remove(index);
				debug!(collection, "deleted document");
				return Ok(1);
			}
		}
		Ok(0)
	}
}

/// Resolve a possibly-dotted field path against a document
fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
	let mut current = doc;
	let mut segments = path.split('.').peekable();
	while let Some(segment) = segments.next() {
		let value = current.get(segment)?;
		if segments.peek().is_none() {
			return Some(value);
		}
		current = value.as_document()?;
	}
	None
}

/// Set a possibly-dotted field path, creating intermediate documents
fn set_path(doc: &mut Document, path: &str, value: Bson) {
	let mut current = doc;
	let mut segments = path.split('.').peekable();
	while let Some(segment) = segments.next() {
		if segments.peek().is_none() {
			current.insert(segment, value);
			return;
		}
		if !matches!(current.get(segment), Some(Bson::Document(_))) {
			current.insert(segment, Document::new());
		}
		// Just inserted or verified a document, so this cannot fail
		let Some(Bson::Document(next)) = current.get_mut(segment) else {
			return;
		};
		current = next;
	}
}

fn bson_to_i64(value: &Bson) -> Option<i64> {
	match value {
		Bson::Int32(n) => Some(i64::from(*n)),
		Bson::Int64(n) => Some(*n),
		Bson::Double(n) => Some(*n as i64),
		_ => None,
	}
}

fn id_string(id: Option<&Bson>) -> String {
	match id {
		Some(Bson::ObjectId(oid)) => oid.to_hex(),
		Some(Bson::String(s)) => s.clone(),
		Some(other) => other.to_string(),
		None => String::new(),
	}
}

/// Compare two optional BSON values for sorting; absent sorts first
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(a), Some(b)) => match (a, b) {
			(Bson::String(a), Bson::String(b)) => a.cmp(b),
			(Bson::DateTime(a), Bson::DateTime(b)) => {
				a.timestamp_millis().cmp(&b.timestamp_millis())
			}
			_ => match (to_f64(a), to_f64(b)) {
				(Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
				_ => Ordering::Equal,
			},
		},
	}
}

fn to_f64(value: &Bson) -> Option<f64> {
	match value {
		Bson::Int32(n) => Some(f64::from(*n)),
		Bson::Int64(n) => Some(*n as f64),
		Bson::Double(n) => Some(*n),
		_ => None,
	}
}

/// Evaluate a filter document against a stored document
///
/// Supports direct equality on (possibly dotted) field paths and the
/// `$regex` operator with the `i` option.
fn matches_filter(doc: &Document, filter: &Document) -> StoreResult<bool> {
	for (key, expected) in filter.iter() {
		let actual = get_path(doc, key);
		let matched = match expected {
			Bson::Document(spec) if is_operator_doc(spec) => {
				matches_operators(actual, spec, key)?
			}
			_ => actual == Some(expected),
		};
		if !matched {
			return Ok(false);
		}
	}
	Ok(true)
}

fn is_operator_doc(spec: &Document) -> bool {
	spec.keys().any(|k| k.starts_with('$'))
}

fn matches_operators(actual: Option<&Bson>, spec: &Document, field: &str) -> StoreResult<bool> {
	for (op, operand) in spec.iter() {
		match op.as_str() {
			"$regex" => {
				let Some(pattern) = operand.as_str() else {
					return Err(StoreError::InvalidFilter(format!(
						"$regex on '{field}' requires a string pattern"
					)));
				};
				let case_insensitive = spec
					.get_str("$options")
					.map(|opts| opts.contains('i'))
					.unwrap_or(false);
				let pattern = if case_insensitive {
					format!("(?i){pattern}")
				} else {
					pattern.to_string()
				};
				let regex = Regex::new(&pattern)?;
				let Some(Bson::String(value)) = actual else {
					return Ok(false);
				};
				if !regex.is_match(value) {
					return Ok(false);
				}
			}
			"$options" => {} // consumed alongside $regex
			other => {
				return Err(StoreError::Unsupported(format!(
					"filter operator '{other}' on '{field}'"
				)));
			}
		}
	}
	Ok(true)
}

/// Apply an update document; returns whether anything changed
fn apply_update(doc: &mut Document, update: &Document) -> StoreResult<bool> {
	let mut changed = false;
	for (op, spec) in update.iter() {
		let Some(spec) = spec.as_document() else {
			return Err(StoreError::InvalidFilter(format!(
				"update operator '{op}' requires a document operand"
			)));
		};
		match op.as_str() {
			"$set" => {
				for (path, value) in spec.iter() {
					if get_path(doc, path) != Some(value) {
						set_path(doc, path, value.clone());
						changed = true;
					}
				}
			}
			"$push" => {
				for (path, value) in spec.iter() {
					array_at(doc, path).push(value.clone());
					changed = true;
				}
			}
			"$addToSet" => {
				for (path, value) in spec.iter() {
					let array = array_at(doc, path);
					if !array.contains(value) {
						array.push(value.clone());
						changed = true;
					}
				}
			}
			"$pull" => {
				for (path, value) in spec.iter() {
					let array = array_at(doc, path);
					let before = array.len();
					array.retain(|item| item != value);
					changed |= array.len() != before;
				}
			}
			other => {
				return Err(StoreError::Unsupported(format!(
					"update operator '{other}'"
				)));
			}
		}
	}
	Ok(changed)
}

/// Get the array at a path, replacing non-array values with an empty array
fn array_at<'a>(doc: &'a mut Document, path: &str) -> &'a mut Vec<Bson> {
	if !matches!(get_path(doc, path), Some(Bson::Array(_))) {
		set_path(doc, path, Bson::Array(Vec::new()));
	}
	// set_path above guarantees an array at this path
	let mut current = doc;
	let mut segments = path.split('.').peekable();
	loop {
		let Some(segment) = segments.next() else {
			unreachable!("empty field path")
		};
		if segments.peek().is_none() {
			match current.get_mut(segment) {
				Some(Bson::Array(array)) => return array,
				_ => unreachable!("array_at established an array at this path"),
			}
		}
		match current.get_mut(segment) {
			Some(Bson::Document(next)) => current = next,
			_ => unreachable!("set_path created intermediate documents"),
		}
	}
}
