//! End-to-end scenario coverage for the booking, session, report and
//! tagging lifecycles, run against the deterministic in-memory store.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use fieldsport_core::types::{
    BookingStatus, Capacity, Field, FieldId, FieldType, Money, SessionStatus, User, UserId,
};
use fieldsport_core::{
    NewBooking, PlatformError, PlatformStore, Quota, SpeciesQuota,
};
use fieldsport_server::artifacts::LocalArtifactStore;
use fieldsport_server::tagging::{IssueTag, TaggingService};
use fieldsport_testing::{FixedClock, MemoryStore};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock_on(date: NaiveDate) -> Arc<FixedClock> {
    Arc::new(FixedClock::at(
        date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
    ))
}

fn user(name: &str) -> User {
    User {
        id: UserId::new(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        name: name.to_string(),
        phone: Some("+44 7700 900000".to_string()),
        location: Some("London, UK".to_string()),
    }
}

fn field(owner: &User, name: &str, capacity: u32, quota: Quota) -> Field {
    Field {
        id: FieldId::new(),
        name: name.to_string(),
        owner_id: owner.id,
        location: "Scottish Highlands".to_string(),
        field_type: if quota.is_tracked() {
            FieldType::DiyLeased
        } else {
            FieldType::Subsidised
        },
        capacity: Capacity::new(capacity),
        price_per_day: Money::from_pence(0),
        blocked_dates: BTreeSet::new(),
        quota,
        auto_approve_bookings: true,
        last_visit: None,
        created_at: chrono::Utc::now(),
    }
}

fn booking_request(field: &Field, hunter: &User, date: NaiveDate, num_hunters: u32) -> NewBooking {
    NewBooking {
        field_id: field.id,
        hunter_id: hunter.id,
        date,
        num_hunters,
        total_price: Money::from_pence(0),
        payment_ref: None,
        admin_override: false,
    }
}

fn report_request(
    session: &fieldsport_core::types::HuntSession,
    species: &str,
    quantity: u32,
) -> fieldsport_core::NewHuntReport {
    fieldsport_core::NewHuntReport {
        session_id: session.id,
        field_id: session.field_id,
        hunter_id: session.hunter_id,
        animals_harvested: quantity,
        species_harvested: if quantity > 0 {
            vec![fieldsport_core::types::HarvestEntry {
                species: species.to_string(),
                quantity,
            }]
        } else {
            Vec::new()
        },
        animals: Vec::new(),
        ground_remarks: None,
        weather_conditions: Some("Overcast".to_string()),
        time_spent_hours: Some(6.5),
        notes: None,
        review_rating: None,
        review_text: None,
    }
}

// Scenario A: a field with capacity 2 accepts a party of 2, then rejects
// a further party of 1 on the same day with the remaining headroom.
#[tokio::test]
async fn capacity_is_enforced_across_bookings() {
    let hunt_day = day(2025, 10, 20);
    let store = MemoryStore::new(clock_on(day(2025, 10, 1)));
    let owner = user("Estate Management");
    let first = user("John Hunter");
    let second = user("Hans Schmidt");
    let estate = field(&owner, "Highland Estate", 2, Quota::Untracked);
    for u in [&owner, &first, &second] {
        store.insert_user(u.clone()).unwrap();
    }
    store.insert_field(estate.clone()).unwrap();

    store
        .create_booking(booking_request(&estate, &first, hunt_day, 2))
        .await
        .unwrap();

    let err = store
        .create_booking(booking_request(&estate, &second, hunt_day, 1))
        .await
        .unwrap_err();
    assert_eq!(err, PlatformError::CapacityExceeded { remaining: 0 });

    // The availability read agrees with the write path.
    let err = store
        .check_availability(estate.id, hunt_day, 1)
        .await
        .unwrap_err();
    assert_eq!(err, PlatformError::CapacityExceeded { remaining: 0 });
}

// Scenario B: one active booking per hunter per day, platform-wide,
// unless an administrator overrides.
#[tokio::test]
async fn double_booking_is_prevented_across_fields() {
    let hunt_day = day(2025, 10, 20);
    let store = MemoryStore::new(clock_on(day(2025, 10, 1)));
    let owner = user("Estate Management");
    let hunter = user("John Hunter");
    let mut field_a = field(&owner, "Highland Estate", 4, Quota::Untracked);
    field_a.auto_approve_bookings = false; // pending still blocks
    let field_b = field(&owner, "Yorkshire Moorland Shoot", 4, Quota::Untracked);
    store.insert_user(owner.clone()).unwrap();
    store.insert_user(hunter.clone()).unwrap();
    store.insert_field(field_a.clone()).unwrap();
    store.insert_field(field_b.clone()).unwrap();

    let first = store
        .create_booking(booking_request(&field_a, &hunter, hunt_day, 1))
        .await
        .unwrap();
    assert_eq!(first.status, BookingStatus::Pending);

    let err = store
        .create_booking(booking_request(&field_b, &hunter, hunt_day, 1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PlatformError::DoubleBooking {
            date: hunt_day,
            field_name: "Highland Estate".to_string(),
        }
    );

    // Admin override is the documented escape hatch.
    let mut override_request = booking_request(&field_b, &hunter, hunt_day, 1);
    override_request.admin_override = true;
    let second = store.create_booking(override_request).await.unwrap();
    assert_eq!(second.field_id, field_b.id);

    // A cancelled booking frees the day again.
    store
        .update_booking_status(second.id, BookingStatus::Confirmed, true)
        .await
        .unwrap();
    store
        .update_booking_status(second.id, BookingStatus::Cancelled, false)
        .await
        .unwrap();
    store
        .update_booking_status(first.id, BookingStatus::Rejected, false)
        .await
        .unwrap();
    store
        .create_booking(booking_request(&field_b, &hunter, hunt_day, 1))
        .await
        .unwrap();
}

// Scenario C: quota depletes per species and clamps at zero on
// over-harvest instead of going negative.
#[tokio::test]
async fn quota_depletes_and_clamps_at_zero() {
    let hunt_day = day(2025, 10, 20);
    let clock = clock_on(hunt_day);
    let store = MemoryStore::new(clock);
    let owner = user("Highland Estates");
    let first = user("John Hunter");
    let second = user("Hans Schmidt");
    let moor = field(
        &owner,
        "Cairngorms Sporting Estate",
        4,
        Quota::species(vec![SpeciesQuota::new("Red Deer".to_string(), 10)]),
    );
    for u in [&owner, &first, &second] {
        store.insert_user(u.clone()).unwrap();
    }
    store.insert_field(moor.clone()).unwrap();

    // First hunter takes 3: remaining 10 -> 7.
    let booking = store
        .create_booking(booking_request(&moor, &first, hunt_day, 1))
        .await
        .unwrap();
    let session = store.find_or_create_session(booking.id).await.unwrap();
    store.start_session(session.id).await.unwrap();
    store
        .create_hunt_report(report_request(&session, "Red Deer", 3))
        .await
        .unwrap();
    assert_eq!(
        store.get_field(moor.id).await.unwrap().quota.remaining(),
        Some(7)
    );

    // Second hunter reports 8 more: clamps to 0, not -1.
    let booking = store
        .create_booking(booking_request(&moor, &second, hunt_day, 1))
        .await
        .unwrap();
    let session = store.find_or_create_session(booking.id).await.unwrap();
    store.start_session(session.id).await.unwrap();
    store
        .create_hunt_report(report_request(&session, "Red Deer", 8))
        .await
        .unwrap();

    let after = store.get_field(moor.id).await.unwrap();
    assert_eq!(after.quota.remaining(), Some(0));
    assert!(after.quota.is_exhausted());
    assert!(after.quota.is_consistent());
    // Idempotent read.
    assert_eq!(after.quota.is_exhausted(), after.quota.is_exhausted());
    // The report engine also stamps the field's last visit.
    assert_eq!(after.last_visit.unwrap().date, hunt_day);
    assert!(after.last_visit.unwrap().had_harvest);
}

// Scenario D: the session state machine is linear and gated on the
// report: start twice fails, ending before the report fails, report
// then end completes.
#[tokio::test]
async fn session_lifecycle_is_linear_and_report_gated() {
    let hunt_day = day(2025, 10, 20);
    let clock = clock_on(day(2025, 10, 19));
    let store = MemoryStore::new(clock.clone());
    let owner = user("Marsh Warden");
    let hunter = user("John Hunter");
    let marsh = field(&owner, "Lake District Wildfowling", 4, Quota::Untracked);
    store.insert_user(owner.clone()).unwrap();
    store.insert_user(hunter.clone()).unwrap();
    store.insert_field(marsh.clone()).unwrap();

    let booking = store
        .create_booking(booking_request(&marsh, &hunter, hunt_day, 1))
        .await
        .unwrap();

    // Sessions never materialize before the hunt day.
    let err = store.find_or_create_session(booking.id).await.unwrap_err();
    assert!(matches!(err, PlatformError::InvalidSequence(_)));
    assert!(store.session_by_booking(booking.id).await.unwrap().is_none());

    // On the day: materialize once, idempotently.
    clock.set(hunt_day.and_hms_opt(6, 0, 0).unwrap().and_utc());
    let session = store.find_or_create_session(booking.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::NotStarted);
    let again = store.find_or_create_session(booking.id).await.unwrap();
    assert_eq!(again.id, session.id);

    let session = store.start_session(session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Active);
    assert!(session.start_time.is_some());

    let err = store.start_session(session.id).await.unwrap_err();
    assert!(matches!(err, PlatformError::InvalidSequence(_)));

    // Ending before the report is a sequencing error.
    let err = store.end_session(session.id).await.unwrap_err();
    assert!(matches!(err, PlatformError::InvalidSequence(_)));

    // Empty-handed report is valid and leaves quota untouched.
    store
        .create_hunt_report(report_request(&session, "Mallard", 0))
        .await
        .unwrap();
    let session = store.end_session(session.id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.end_time.is_some());

    // Terminal: nothing moves a completed session.
    assert!(store.start_session(session.id).await.is_err());
    assert!(store.end_session(session.id).await.is_err());

    // Exactly one report per session.
    let err = store
        .create_hunt_report(report_request(&session, "Mallard", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::InvalidSequence(_)));
}

// Scenario E: two tags get distinct numbers, verification resolves each
// to its own record, and an unissued number is a definitive not-found.
#[tokio::test]
async fn tags_are_unique_and_verifiable() {
    let hunt_day = day(2025, 10, 20);
    let clock = clock_on(hunt_day);
    let store = Arc::new(MemoryStore::new(clock));
    let owner = user("Highland Estates");
    let hunter = user("John Hunter");
    let moor = field(
        &owner,
        "Cairngorms Sporting Estate",
        4,
        Quota::species(vec![SpeciesQuota::new("Red Grouse".to_string(), 300)]),
    );
    store.insert_user(owner.clone()).unwrap();
    store.insert_user(hunter.clone()).unwrap();
    store.insert_field(moor.clone()).unwrap();

    let booking = store
        .create_booking(booking_request(&moor, &hunter, hunt_day, 1))
        .await
        .unwrap();
    let session = store.find_or_create_session(booking.id).await.unwrap();
    store.start_session(session.id).await.unwrap();
    let report = store
        .create_hunt_report(report_request(&session, "Red Grouse", 2))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let platform_store: Arc<dyn PlatformStore> = store.clone();
    let tagging = TaggingService::new(
        platform_store,
        LocalArtifactStore::shared(dir.path()),
        "http://localhost:8080".to_string(),
    );

    let issue = |species: &str| IssueTag {
        report_id: report.id,
        species: species.to_string(),
        condition: "Good".to_string(),
        photo: Some(vec![0xFF, 0xD8, 0xFF]),
        physical_tag: None,
        disease: None,
        notes: None,
    };

    let first = tagging.issue_tag(issue("Red Grouse")).await.unwrap();
    let second = tagging.issue_tag(issue("Red Grouse")).await.unwrap();
    assert_ne!(first.tag_number, second.tag_number);

    // Both artifacts exist for each tag.
    for tag in [&first, &second] {
        assert!(dir.path().join(&tag.scan_code_key).is_file());
        assert!(dir
            .path()
            .join(tag.photo_key.as_ref().unwrap())
            .is_file());
    }

    let verified = tagging.verify(&first.tag_number).await.unwrap().unwrap();
    assert_eq!(verified.tag.id, first.id);
    assert_eq!(verified.tag.tag_number, first.tag_number);
    assert_eq!(verified.hunter.id, hunter.id);
    assert_eq!(verified.field_name, "Cairngorms Sporting Estate");

    let other = tagging.verify(&second.tag_number).await.unwrap().unwrap();
    assert_eq!(other.tag.tag_number, second.tag_number);
    assert_ne!(verified.tag.id, other.tag.id);

    let missing = tagging
        .verify(&fieldsport_core::types::TagNumber::mint())
        .await
        .unwrap();
    assert!(missing.is_none());
}

// Tagging an empty-handed report is a sequencing error, and a failed
// record insert removes the artifacts it had written.
#[tokio::test]
async fn empty_handed_reports_cannot_be_tagged() {
    let hunt_day = day(2025, 10, 20);
    let clock = clock_on(hunt_day);
    let store = Arc::new(MemoryStore::new(clock));
    let owner = user("Marsh Warden");
    let hunter = user("John Hunter");
    let marsh = field(&owner, "Lake District Wildfowling", 4, Quota::Untracked);
    store.insert_user(owner.clone()).unwrap();
    store.insert_user(hunter.clone()).unwrap();
    store.insert_field(marsh.clone()).unwrap();

    let booking = store
        .create_booking(booking_request(&marsh, &hunter, hunt_day, 1))
        .await
        .unwrap();
    let session = store.find_or_create_session(booking.id).await.unwrap();
    store.start_session(session.id).await.unwrap();
    let report = store
        .create_hunt_report(report_request(&session, "Mallard", 0))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let platform_store: Arc<dyn PlatformStore> = store.clone();
    let tagging = TaggingService::new(
        platform_store,
        LocalArtifactStore::shared(dir.path()),
        "http://localhost:8080".to_string(),
    );

    let err = tagging
        .issue_tag(IssueTag {
            report_id: report.id,
            species: "Mallard".to_string(),
            condition: "Good".to_string(),
            photo: None,
            physical_tag: None,
            disease: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::InvalidSequence(_)));

    // No artifacts were left behind.
    assert!(!dir.path().join("scan_codes").exists());
}
