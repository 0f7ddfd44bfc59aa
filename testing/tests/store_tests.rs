//! Behavioural checks for the in-memory store that the scenario suites
//! don't reach: directory lookups, read-path ordering, review edits.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use fieldsport_core::types::{
    BookingStatus, Capacity, Field, FieldId, FieldType, Money, User, UserId,
};
use fieldsport_core::{NewBooking, PlatformError, PlatformStore, Quota, ReviewUpdate};
use fieldsport_testing::{FixedClock, MemoryStore};
use std::collections::BTreeSet;
use std::sync::Arc;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

fn store_at(date: NaiveDate) -> (MemoryStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at(
        date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
    ));
    (MemoryStore::new(clock.clone()), clock)
}

fn seed(store: &MemoryStore) -> (User, Field) {
    let hunter = User {
        id: UserId::new(),
        email: "hunter@example.com".to_string(),
        name: "John Hunter".to_string(),
        phone: None,
        location: None,
    };
    let field = Field {
        id: FieldId::new(),
        name: "Highland Estate".to_string(),
        owner_id: hunter.id,
        location: "Scottish Highlands".to_string(),
        field_type: FieldType::Subsidised,
        capacity: Capacity::new(4),
        price_per_day: Money::from_pence(45_000),
        blocked_dates: BTreeSet::new(),
        quota: Quota::Untracked,
        auto_approve_bookings: true,
        last_visit: None,
        created_at: chrono::Utc::now(),
    };
    store.insert_user(hunter.clone()).unwrap();
    store.insert_field(field.clone()).unwrap();
    (hunter, field)
}

fn request(field: &Field, hunter: &User, date: NaiveDate) -> NewBooking {
    NewBooking {
        field_id: field.id,
        hunter_id: hunter.id,
        date,
        num_hunters: 1,
        total_price: Money::from_pence(45_000),
        payment_ref: None,
        admin_override: false,
    }
}

#[tokio::test]
async fn directory_lookups_resolve_by_id_and_email() {
    let (store, _clock) = store_at(day(1));
    let (hunter, field) = seed(&store);

    assert_eq!(store.get_user(hunter.id).await.unwrap().name, "John Hunter");
    assert_eq!(
        store.get_user_by_email("hunter@example.com").await.unwrap().id,
        hunter.id
    );
    assert_eq!(store.get_field(field.id).await.unwrap().name, field.name);
    assert_eq!(store.list_fields().await.unwrap().len(), 1);

    let err = store.get_user_by_email("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, PlatformError::NotFound { .. }));
}

#[tokio::test]
async fn booking_reads_are_newest_first() {
    let (store, clock) = store_at(day(1));
    let (hunter, field) = seed(&store);

    store.create_booking(request(&field, &hunter, day(10))).await.unwrap();
    clock.set(day(2).and_hms_opt(8, 0, 0).unwrap().and_utc());
    let newest = store
        .create_booking(request(&field, &hunter, day(11)))
        .await
        .unwrap();

    let by_hunter = store.bookings_by_hunter(hunter.id).await.unwrap();
    assert_eq!(by_hunter.len(), 2);
    assert_eq!(by_hunter[0].id, newest.id);

    let by_field = store.bookings_by_field(field.id).await.unwrap();
    assert_eq!(by_field[0].id, newest.id);
}

#[tokio::test]
async fn todays_bookings_exclude_other_days_and_statuses() {
    let (store, _clock) = store_at(day(1));
    let (hunter, field) = seed(&store);

    let today = store
        .create_booking(request(&field, &hunter, day(1)))
        .await
        .unwrap();
    store.create_booking(request(&field, &hunter, day(2))).await.unwrap();

    let todays = store.todays_confirmed_bookings(hunter.id).await.unwrap();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].id, today.id);

    store
        .update_booking_status(today.id, BookingStatus::Cancelled, false)
        .await
        .unwrap();
    assert!(store
        .todays_confirmed_bookings(hunter.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn review_edits_touch_only_review_fields() {
    let (store, _clock) = store_at(day(1));
    let (hunter, field) = seed(&store);

    let booking = store
        .create_booking(request(&field, &hunter, day(1)))
        .await
        .unwrap();
    let session = store.find_or_create_session(booking.id).await.unwrap();
    store.start_session(session.id).await.unwrap();
    let report = store
        .create_hunt_report(fieldsport_core::NewHuntReport {
            session_id: session.id,
            field_id: session.field_id,
            hunter_id: session.hunter_id,
            animals_harvested: 0,
            species_harvested: Vec::new(),
            animals: Vec::new(),
            ground_remarks: Some("gate lock replaced".to_string()),
            weather_conditions: None,
            time_spent_hours: None,
            notes: None,
            review_rating: None,
            review_text: None,
        })
        .await
        .unwrap();

    let updated = store
        .update_hunt_report(
            report.id,
            ReviewUpdate {
                rating: Some(4),
                text: Some("Good morning flight".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.review_rating, Some(4));
    assert_eq!(updated.ground_remarks.as_deref(), Some("gate lock replaced"));
    assert_eq!(updated.animals_harvested, 0);

    // An empty edit is refused.
    let err = store
        .update_hunt_report(report.id, ReviewUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::InvalidInput(_)));
}
