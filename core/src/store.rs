//! The storage surface of the platform.
//!
//! [`PlatformStore`] is the one seam between the domain and persistence.
//! Two implementations exist: the PostgreSQL store (production, one
//! transaction per check-then-act operation) and the in-memory store
//! (deterministic tests and demos). Both delegate invariant decisions to
//! the pure functions in this crate so the rules cannot drift.

use crate::booking::NewBooking;
use crate::error::Result;
use crate::report::{NewHuntReport, ReviewUpdate};
use crate::types::{
    AnimalTag, Booking, BookingId, BookingStatus, Field, FieldId, HuntReport, HuntSession,
    ReportId, SessionId, TagId, TagNumber, User, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Parameters for persisting an animal tag record.
///
/// The tag number and artifact keys are minted by the tagging service
/// before the row is written, so a persisted tag never references a
/// missing artifact. Callers must guarantee the parent report harvested
/// at least one animal — tagging an empty-handed report is a logic
/// error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAnimalTag {
    /// Pre-minted record identifier (artifacts are keyed before insert)
    pub id: TagId,
    /// Pre-minted globally unique tag number
    pub tag_number: TagNumber,
    /// Parent hunt report
    pub report_id: ReportId,
    /// Hunter who tagged the animal
    pub hunter_id: UserId,
    /// Field the animal was taken on
    pub field_id: FieldId,
    /// Species of the animal
    pub species: String,
    /// Observed condition
    pub condition: String,
    /// Artifact key of the animal photo, if one was captured
    pub photo_key: Option<String>,
    /// Artifact key of the rendered scan-code image
    pub scan_code_key: String,
    /// Physical tag number attached in the field, if different
    pub physical_tag: Option<String>,
    /// Disease information, if applicable
    pub disease: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Booking, availability, quota, session, report and tagging operations,
/// plus the directory reads consumed from external user/field
/// management.
///
/// Every mutating operation is atomic with its own validity checks: two
/// near-simultaneous booking requests for the same hunter+date, or for
/// the same field+date near capacity, must not both succeed.
#[async_trait]
pub trait PlatformStore: Send + Sync {
    // ------------------------------------------------------------------
    // Directory reads (owned by external user/field management)
    // ------------------------------------------------------------------

    /// Looks up a user by id.
    async fn get_user(&self, id: UserId) -> Result<User>;

    /// Looks up a user by email address.
    async fn get_user_by_email(&self, email: &str) -> Result<User>;

    /// Looks up a field by id.
    async fn get_field(&self, id: FieldId) -> Result<Field>;

    /// Lists all fields.
    async fn list_fields(&self) -> Result<Vec<Field>>;

    // ------------------------------------------------------------------
    // Availability
    // ------------------------------------------------------------------

    /// Answers whether `field_id` can accept `num_hunters` more hunters
    /// on `date`. Pure read, no side effects; `Ok(())` means available,
    /// the error carries the reason (blocked date, or capacity with the
    /// remaining headroom).
    async fn check_availability(
        &self,
        field_id: FieldId,
        date: NaiveDate,
        num_hunters: u32,
    ) -> Result<()>;

    // ------------------------------------------------------------------
    // Booking lifecycle
    // ------------------------------------------------------------------

    /// Creates a booking atomically with the double-booking and capacity
    /// checks. Initial status comes from the field's
    /// `auto_approve_bookings` flag. `admin_override` skips both
    /// invariant checks.
    async fn create_booking(&self, new: NewBooking) -> Result<Booking>;

    /// Looks up a booking by id.
    async fn get_booking(&self, id: BookingId) -> Result<Booking>;

    /// Applies a status transition. Illegal transitions fail with
    /// `InvalidSequence` unless `force` is set (the administrative
    /// status editor, exempt from the lifecycle rules).
    async fn update_booking_status(
        &self,
        id: BookingId,
        to: BookingStatus,
        force: bool,
    ) -> Result<Booking>;

    /// All bookings made by a hunter, newest first.
    async fn bookings_by_hunter(&self, hunter_id: UserId) -> Result<Vec<Booking>>;

    /// All bookings on a field, newest first.
    async fn bookings_by_field(&self, field_id: FieldId) -> Result<Vec<Booking>>;

    /// The hunter's confirmed bookings dated today.
    async fn todays_confirmed_bookings(&self, hunter_id: UserId) -> Result<Vec<Booking>>;

    // ------------------------------------------------------------------
    // Hunt sessions
    // ------------------------------------------------------------------

    /// Returns the session for a booking, materializing it on first
    /// access. Only a confirmed booking dated today may materialize a
    /// session; exactly one session ever exists per booking.
    async fn find_or_create_session(&self, booking_id: BookingId) -> Result<HuntSession>;

    /// Looks up a session by id.
    async fn get_session(&self, id: SessionId) -> Result<HuntSession>;

    /// Starts the day: `not_started → active`, stamps the start time.
    async fn start_session(&self, id: SessionId) -> Result<HuntSession>;

    /// Ends the day: `active → completed`, stamps the end time. Fails
    /// with `InvalidSequence` when no hunt report has been filed — the
    /// report must come first.
    async fn end_session(&self, id: SessionId) -> Result<HuntSession>;

    /// The session for a booking, if one has materialized.
    async fn session_by_booking(&self, booking_id: BookingId) -> Result<Option<HuntSession>>;

    /// All sessions of a hunter.
    async fn sessions_by_hunter(&self, hunter_id: UserId) -> Result<Vec<HuntSession>>;

    /// All sessions on a field.
    async fn sessions_by_field(&self, field_id: FieldId) -> Result<Vec<HuntSession>>;

    // ------------------------------------------------------------------
    // Hunt reports & quota ledger
    // ------------------------------------------------------------------

    /// Files the report for an active, unreported session and depletes
    /// the field's quota in the same transaction. A report is never
    /// persisted without its quota effect, and vice versa.
    async fn create_hunt_report(&self, new: NewHuntReport) -> Result<HuntReport>;

    /// Edits the review fields of an existing report. Harvest data is
    /// immutable.
    async fn update_hunt_report(&self, id: ReportId, review: ReviewUpdate) -> Result<HuntReport>;

    /// Looks up a report by id.
    async fn get_report(&self, id: ReportId) -> Result<HuntReport>;

    /// The report filed against a session, if any.
    async fn report_by_session(&self, session_id: SessionId) -> Result<Option<HuntReport>>;

    /// All reports filed on a field, newest first.
    async fn reports_by_field(&self, field_id: FieldId) -> Result<Vec<HuntReport>>;

    // ------------------------------------------------------------------
    // Animal tags
    // ------------------------------------------------------------------

    /// Persists a tag record. The parent report must exist.
    async fn create_animal_tag(&self, new: NewAnimalTag) -> Result<AnimalTag>;

    /// Public verification lookup. `Ok(None)` is a definitive not-found,
    /// distinguishable from a storage error.
    async fn tag_by_number(&self, number: &TagNumber) -> Result<Option<AnimalTag>>;

    /// All tags issued against a report.
    async fn tags_by_report(&self, report_id: ReportId) -> Result<Vec<AnimalTag>>;

    /// All tags issued by a hunter, newest first.
    async fn tags_by_hunter(&self, hunter_id: UserId) -> Result<Vec<AnimalTag>>;
}
