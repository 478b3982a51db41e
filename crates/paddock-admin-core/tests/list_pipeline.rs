//! Full list-screen pipeline: raw stored documents through normalization,
//! status stamping and pagination.

use chrono::{TimeZone, Utc};
use bson::doc;
use serde_json::Value;

use paddock_admin_core::listing::{ListQuery, SearchField, SortDirection, paginate};
use paddock_admin_core::normalize::RecordShape;
use paddock_admin_core::status;
use paddock_store::{DocumentBackend, FindOptions, MemoryBackend};

#[tokio::test]
async fn order_list_screen_end_to_end() {
	let store = MemoryBackend::new();
	store
		.insert_one(
			"orders",
			doc! {
				"orderId": "ord-1",
				"customerInfo": { "fullName": "Ali Kaya", "email": "ali@example.com" },
				"date": bson::DateTime::from_millis(
					Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap().timestamp_millis(),
				),
				"tickets": [ { "id": "t1", "name": "Standard", "price": 100, "quantity": 2 } ],
				"totalAmount": 9_999,
			},
		)
		.await
		.unwrap();
	store
		.insert_one(
			"orders",
			doc! {
				"orderId": "ord-2",
				"customerInfo": { "fullName": "Jane Doe" },
				"date": bson::DateTime::from_millis(
					Utc.with_ymd_and_hms(2026, 3, 16, 20, 0, 0).unwrap().timestamp_millis(),
				),
				"tickets": [ { "id": "t1", "name": "VIP", "price": 150, "quantity": 1 } ],
			},
		)
		.await
		.unwrap();
	// Legacy document missing almost everything
	store.insert_one("orders", doc! { "orderId": "ord-3" }).await.unwrap();

	let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
	let raw = store
		.find_many("orders", doc! {}, FindOptions::new())
		.await
		.unwrap();
	let records: Vec<Value> = raw
		.iter()
		.map(|doc| {
			let mut record = RecordShape::EVENT_ORDER.normalize(doc);
			status::annotate(&mut record, now);
			record
		})
		.collect();

	// Stored totals are replaced and defaults filled before listing
	assert_eq!(records[0]["totalAmount"], 200);
	assert_eq!(records[0]["status"], "today");
	assert_eq!(records[1]["status"], "this-week");
	assert_eq!(records[2]["customerInfo"]["fullName"], "Unknown");
	assert!(records[2].get("status").is_none());

	let fields = vec![
		SearchField::stored("orderId"),
		SearchField::stored("customerInfo.fullName"),
		SearchField::TicketTotal,
	];

	// Search hits the recomputed total, not the stale stored 9999
	let page = paginate(&records, &fields, &ListQuery::default().with_search("200"));
	assert_eq!(page.count, 1);
	assert_eq!(page.results[0]["orderId"], "ord-1");

	let page = paginate(&records, &fields, &ListQuery::default().with_search("9999"));
	assert_eq!(page.count, 0);

	// Newest first; the dateless legacy record sinks to the end
	let page = paginate(
		&records,
		&fields,
		&ListQuery::default()
			.sort_by("date")
			.direction(SortDirection::Desc),
	);
	assert_eq!(page.results[0]["orderId"], "ord-2");
	assert_eq!(page.results[2]["orderId"], "ord-3");
	assert_eq!(page.total_pages, 1);
}
