//! Temporal classification of events.
//!
//! Event records carry a single `date` instant; list screens group them
//! into buckets relative to "now". The bucket is never stored — it is
//! recomputed on every read, with `now` injected so the classifier stays
//! deterministic under test.
//!
//! The rule is calendar-day based throughout: an event is `past` only once
//! its calendar day has passed, so a morning session still shows as
//! `today` all day long.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::fields::FieldPath;

/// Temporal bucket of an event relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
	Today,
	Tomorrow,
	ThisWeek,
	Upcoming,
	Past,
}

impl EventStatus {
	/// Classify an event instant against an explicit "now"
	///
	/// Evaluated on calendar days, first match wins:
	///
	/// 1. day before today → [`Past`](Self::Past)
	/// 2. same day → [`Today`](Self::Today)
	/// 3. next day → [`Tomorrow`](Self::Tomorrow)
	/// 4. within the next 7 days inclusive → [`ThisWeek`](Self::ThisWeek)
	/// 5. otherwise → [`Upcoming`](Self::Upcoming)
	///
	/// # Example
	///
	/// ```rust
	/// use paddock_admin_core::EventStatus;
	/// use chrono::{TimeZone, Utc};
	///
	/// let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap();
	/// let this_morning = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
	/// // Already started, but its day is not over: still "today", not "past"
	/// assert_eq!(EventStatus::classify(this_morning, now), EventStatus::Today);
	/// ```
	pub fn classify(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
		let day = date.date_naive();
		let today = now.date_naive();

		if day < today {
			Self::Past
		} else if day == today {
			Self::Today
		} else if day == today + Duration::days(1) {
			Self::Tomorrow
		} else if day <= today + Duration::days(7) {
			Self::ThisWeek
		} else {
			Self::Upcoming
		}
	}

	/// Classify against the current wall clock
	pub fn classify_now(date: DateTime<Utc>) -> Self {
		Self::classify(date, Utc::now())
	}

	/// Kebab-case name as used in record payloads
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Today => "today",
			Self::Tomorrow => "tomorrow",
			Self::ThisWeek => "this-week",
			Self::Upcoming => "upcoming",
			Self::Past => "past",
		}
	}
}

impl std::fmt::Display for EventStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Stamp a normalized event record with its computed status
///
/// Reads the record's `date` field (an RFC 3339 string after
/// normalization) and inserts the bucket under `status`. A missing or
/// unparseable date leaves the record unannotated.
pub fn annotate(record: &mut Value, now: DateTime<Utc>) -> Option<EventStatus> {
	let date_field = FieldPath::new("date");
	let Some(date) = date_field.resolve(record).and_then(parse_instant) else {
		debug!("event record has no parseable date, skipping status");
		return None;
	};

	let status = EventStatus::classify(date, now);
	if let Some(map) = record.as_object_mut() {
		map.insert(
			"status".to_string(),
			Value::String(status.as_str().to_string()),
		);
	}
	Some(status)
}

fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
	let text = value.as_str()?;
	DateTime::parse_from_rfc3339(text)
		.ok()
		.map(|dt| dt.with_timezone(&Utc))
}
