//! HTTP surface coverage: a real server on a random port, driven with
//! `reqwest` against the in-memory store.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use fieldsport_core::types::{
    Capacity, Field, FieldId, FieldType, Money, User, UserId,
};
use fieldsport_core::{PlatformStore, Quota, SpeciesQuota};
use fieldsport_server::artifacts::LocalArtifactStore;
use fieldsport_server::notifications::ConsoleNotifier;
use fieldsport_server::payments::MockPaymentGateway;
use fieldsport_server::tagging::TaggingService;
use fieldsport_server::{build_router, AppState};
use fieldsport_testing::{FixedClock, MemoryStore};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

const HUNT_DAY: &str = "2025-10-20";

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    hunter: User,
    paid_field: Field,
    diy_field: Field,
    // Held so the artifact directory outlives the server.
    _artifacts_dir: tempfile::TempDir,
}

fn hunt_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
}

async fn spawn_app() -> TestApp {
    let clock = Arc::new(FixedClock::at(
        hunt_day().and_hms_opt(6, 0, 0).unwrap().and_utc(),
    ));
    let store = Arc::new(MemoryStore::new(clock));

    let hunter = User {
        id: UserId::new(),
        email: "hunter@example.com".to_string(),
        name: "John Hunter".to_string(),
        phone: Some("+44 7700 900000".to_string()),
        location: Some("London, UK".to_string()),
    };
    let owner = User {
        id: UserId::new(),
        email: "outfitter@example.com".to_string(),
        name: "Estate Management Ltd".to_string(),
        phone: Some("+44 7700 900001".to_string()),
        location: Some("Scottish Highlands".to_string()),
    };
    let paid_field = Field {
        id: FieldId::new(),
        name: "Yorkshire Moorland Shoot".to_string(),
        owner_id: owner.id,
        location: "North Yorkshire".to_string(),
        field_type: FieldType::Subsidised,
        capacity: Capacity::new(2),
        price_per_day: Money::from_pence(38_000),
        blocked_dates: BTreeSet::new(),
        quota: Quota::Untracked,
        auto_approve_bookings: false,
        last_visit: None,
        created_at: chrono::Utc::now(),
    };
    let diy_field = Field {
        id: FieldId::new(),
        name: "Cairngorms Sporting Estate".to_string(),
        owner_id: owner.id,
        location: "Cairngorms National Park".to_string(),
        field_type: FieldType::DiyLeased,
        capacity: Capacity::new(8),
        price_per_day: Money::from_pence(0),
        blocked_dates: BTreeSet::new(),
        quota: Quota::species(vec![SpeciesQuota::new("Red Grouse".to_string(), 300)]),
        auto_approve_bookings: true,
        last_visit: None,
        created_at: chrono::Utc::now(),
    };
    store.insert_user(hunter.clone()).unwrap();
    store.insert_user(owner.clone()).unwrap();
    store.insert_field(paid_field.clone()).unwrap();
    store.insert_field(diy_field.clone()).unwrap();

    let artifacts_dir = tempfile::tempdir().unwrap();
    let platform_store: Arc<dyn PlatformStore> = store;
    let tagging = Arc::new(TaggingService::new(
        platform_store.clone(),
        LocalArtifactStore::shared(artifacts_dir.path()),
        "http://localhost:8080".to_string(),
    ));
    let state = AppState::new(
        platform_store,
        MockPaymentGateway::shared(),
        ConsoleNotifier::shared(
            "noreply@fieldsport-booking.com".to_string(),
            "admin@fieldsport-booking.com".to_string(),
        ),
        tagging,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        hunter,
        paid_field,
        diy_field,
        _artifacts_dir: artifacts_dir,
    }
}

fn card_json() -> Value {
    json!({
        "number": "4242 4242 4242 4242",
        "cvv": "123",
        "expiry": "12/99",
        "holder_name": "John Hunter"
    })
}

#[tokio::test]
async fn health_and_readiness_respond() {
    let app = spawn_app().await;
    let health: Value = app
        .client
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let ready = app
        .client
        .get(format!("{}/ready", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), 200);
}

#[tokio::test]
async fn booking_flow_with_payment_and_double_booking_conflict() {
    let app = spawn_app().await;

    // Availability before anything is booked.
    let availability: Value = app
        .client
        .get(format!(
            "{}/api/fields/{}/availability?date={HUNT_DAY}&hunters=2",
            app.base_url, app.paid_field.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(availability["available"], true);

    // Create a paid booking.
    let response = app
        .client
        .post(format!("{}/api/bookings", app.base_url))
        .json(&json!({
            "field_id": app.paid_field.id,
            "hunter_id": app.hunter.id,
            "date": HUNT_DAY,
            "num_hunters": 2,
            "card": card_json(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["total_price"], 76_000);
    assert!(body["booking"]["payment_ref"]
        .as_str()
        .unwrap()
        .starts_with("pm_"));

    // Same hunter, same day, other field: 409 DOUBLE_BOOKING.
    let conflict = app
        .client
        .post(format!("{}/api/bookings", app.base_url))
        .json(&json!({
            "field_id": app.diy_field.id,
            "hunter_id": app.hunter.id,
            "date": HUNT_DAY,
            "num_hunters": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status(), 409);
    let body: Value = conflict.json().await.unwrap();
    assert_eq!(body["code"], "DOUBLE_BOOKING");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Yorkshire Moorland Shoot"));

    // The field+day is now full: capacity refusal with headroom.
    let availability: Value = app
        .client
        .get(format!(
            "{}/api/fields/{}/availability?date={HUNT_DAY}&hunters=1",
            app.base_url, app.paid_field.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(availability["available"], false);
    assert!(availability["reason"]
        .as_str()
        .unwrap()
        .contains("only 0 spots available"));

    // Operator approves, then the hunter cancels.
    let booking_id = body_booking_id(&app).await;
    let approved = app
        .client
        .put(format!("{}/api/bookings/{booking_id}/status", app.base_url))
        .json(&json!({"status": "confirmed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(approved.status(), 200);
    let approved: Value = approved.json().await.unwrap();
    assert_eq!(approved["status"], "confirmed");

    // An illegal transition is a 409 INVALID_SEQUENCE.
    let illegal = app
        .client
        .put(format!("{}/api/bookings/{booking_id}/status", app.base_url))
        .json(&json!({"status": "rejected"}))
        .send()
        .await
        .unwrap();
    assert_eq!(illegal.status(), 409);
    let illegal: Value = illegal.json().await.unwrap();
    assert_eq!(illegal["code"], "INVALID_SEQUENCE");
}

async fn body_booking_id(app: &TestApp) -> String {
    let bookings: Value = app
        .client
        .get(format!(
            "{}/api/hunters/{}/bookings",
            app.base_url, app.hunter.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    bookings[0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn hunt_day_flow_from_session_to_verified_tag() {
    let app = spawn_app().await;

    // Free DIY field, auto-approved.
    let response: Value = app
        .client
        .post(format!("{}/api/bookings", app.base_url))
        .json(&json!({
            "field_id": app.diy_field.id,
            "hunter_id": app.hunter.id,
            "date": HUNT_DAY,
            "num_hunters": 1,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["booking"]["status"], "confirmed");
    let booking_id = response["booking"]["id"].as_str().unwrap().to_string();

    // It shows up in today's bookings, so the UI can offer the session.
    let todays: Value = app
        .client
        .get(format!(
            "{}/api/hunters/{}/todays-bookings",
            app.base_url, app.hunter.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(todays.as_array().unwrap().len(), 1);

    // Open and start the session.
    let session: Value = app
        .client
        .post(format!("{}/api/bookings/{booking_id}/session", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["status"], "not_started");
    let session_id = session["id"].as_str().unwrap().to_string();

    let started: Value = app
        .client
        .post(format!("{}/api/sessions/{session_id}/start", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["status"], "active");

    // Ending before the report is refused.
    let premature = app
        .client
        .post(format!("{}/api/sessions/{session_id}/end", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(premature.status(), 409);

    // File the report; quota depletes.
    let report: Value = app
        .client
        .post(format!("{}/api/sessions/{session_id}/report", app.base_url))
        .json(&json!({
            "animals_harvested": 2,
            "species_harvested": [{"species": "Red Grouse", "quantity": 2}],
            "animals": [
                {"species": "Red Grouse", "condition": "Good",
                 "disease": null, "physical_tag": null},
                {"species": "Red Grouse", "condition": "Excellent",
                 "disease": null, "physical_tag": null}
            ],
            "ground_remarks": "Lower moor path closed",
            "review_rating": 5,
            "review_text": "Cracking day"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let report_id = report["id"].as_str().unwrap().to_string();
    assert_eq!(report["success"], true);

    let quota: Value = app
        .client
        .get(format!(
            "{}/api/fields/{}/quota",
            app.base_url, app.diy_field.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quota["remaining"], 298);
    assert_eq!(quota["exhausted"], false);

    // End the session.
    let ended: Value = app
        .client
        .post(format!("{}/api/sessions/{session_id}/end", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ended["status"], "completed");

    // The review stays editable afterwards.
    let updated: Value = app
        .client
        .put(format!("{}/api/reports/{report_id}/review", app.base_url))
        .json(&json!({"rating": 4}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["review_rating"], 4);
    assert_eq!(updated["review_text"], "Cracking day");

    // Issue a tag with a photo, then verify it publicly.
    let tag: Value = app
        .client
        .post(format!("{}/api/reports/{report_id}/tags", app.base_url))
        .json(&json!({
            "species": "Red Grouse",
            "condition": "Good",
            "photo_base64": "/9j/4AAQSkZJRg=="
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tag_number = tag["tag_number"].as_str().unwrap().to_string();

    let verified = app
        .client
        .get(format!("{}/verify/{tag_number}", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(verified.status(), 200);
    let verified: Value = verified.json().await.unwrap();
    assert_eq!(verified["tag"]["tag_number"], tag_number.as_str());
    assert_eq!(verified["hunter"]["name"], "John Hunter");
    assert_eq!(verified["field_name"], "Cairngorms Sporting Estate");

    // An unissued tag number is a definitive 404.
    let missing = app
        .client
        .get(format!("{}/verify/not-a-real-tag", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    // The owner keeps visibility over the field's reports.
    let reports: Value = app
        .client
        .get(format!(
            "{}/api/fields/{}/reports",
            app.base_url, app.diy_field.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reports.as_array().unwrap().len(), 1);
}
