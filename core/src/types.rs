//! Domain types for the Fieldsport booking platform.
//!
//! This module contains all value objects and entities for the booking,
//! session, report and tagging subsystems: identifier newtypes, money,
//! fields, bookings, hunt sessions, hunt reports and animal tags.

use crate::quota::Quota;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a platform user (hunter, field owner, admin)
    UserId
}
uuid_id! {
    /// Unique identifier for a bookable hunting field
    FieldId
}
uuid_id! {
    /// Unique identifier for a booking
    BookingId
}
uuid_id! {
    /// Unique identifier for a hunt session
    SessionId
}
uuid_id! {
    /// Unique identifier for a hunt report
    ReportId
}
uuid_id! {
    /// Unique identifier for an animal tag record
    TagId
}

/// Globally unique, never-reused tag number printed on an animal tag.
///
/// Minted from a v4 UUID at tag creation; this is the token embedded in
/// the scan code and looked up by the public verification surface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagNumber(String);

impl TagNumber {
    /// Mints a fresh tag number. Numbers are random 128-bit tokens and
    /// are never derived from reusable state.
    #[must_use]
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing tag number string (e.g. from a lookup request).
    #[must_use]
    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The tag number as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a processed payment, issued by the payment gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef(String);

impl PaymentRef {
    /// Wraps a gateway payment reference
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (pence-based to avoid floating point errors)
// ============================================================================

/// Represents money in pence to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from pence
    #[must_use]
    pub const fn from_pence(pence: u64) -> Self {
        Self(pence)
    }

    /// Creates a `Money` value from whole pounds with overflow checking
    #[must_use]
    pub const fn checked_from_pounds(pounds: u64) -> Option<Self> {
        match pounds.checked_mul(100) {
            Some(pence) => Some(Self(pence)),
            None => None,
        }
    }

    /// Returns the amount in pence
    #[must_use]
    pub const fn pence(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole pounds (rounded down)
    #[must_use]
    pub const fn pounds(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a head count with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{:02}", self.pounds(), self.0 % 100)
    }
}

// ============================================================================
// Capacity
// ============================================================================

/// Maximum number of concurrent hunters a field can host on one day
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(pub u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Directory entities (owned by external user/field management)
// ============================================================================

/// Platform user summary as consumed from the external user directory.
///
/// Authentication, credentials and compliance paperwork live with the
/// external user-management collaborator; the booking core only reads
/// the contact summary it needs for records and notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Email address (unique across the platform)
    pub email: String,
    /// Display name
    pub name: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Free-text home location
    pub location: Option<String>,
}

/// Commercial model of a hunting field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Self-guided field with explicit harvest quotas
    DiyLeased,
    /// Guided field priced per outing, subsidised for members
    Subsidised,
    /// Guided field for international visitors
    International,
}

impl FieldType {
    /// Whether this field type tracks harvest quotas
    #[must_use]
    pub const fn tracks_quota(self) -> bool {
        matches!(self, Self::DiyLeased)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiyLeased => write!(f, "diy-leased"),
            Self::Subsidised => write!(f, "subsidised"),
            Self::International => write!(f, "international"),
        }
    }
}

/// Marker left on a field by the most recent hunt report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastVisit {
    /// Calendar day of the visit
    pub date: NaiveDate,
    /// Whether any animal was harvested on that visit
    pub had_harvest: bool,
}

/// A bookable hunting ground/property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique field identifier
    pub id: FieldId,
    /// Field name (e.g. "Cairngorms Sporting Estate")
    pub name: String,
    /// Owning user (outfitter or landowner)
    pub owner_id: UserId,
    /// Free-text location
    pub location: String,
    /// Commercial model of the field
    pub field_type: FieldType,
    /// Maximum concurrent hunters per day
    pub capacity: Capacity,
    /// Price per hunter per day
    pub price_per_day: Money,
    /// Days the owner has blocked out
    pub blocked_dates: BTreeSet<NaiveDate>,
    /// Harvest allowance for the season
    pub quota: Quota,
    /// Whether new bookings confirm without operator approval
    pub auto_approve_bookings: bool,
    /// Most recent reported visit, if any
    pub last_visit: Option<LastVisit>,
    /// When the field was registered
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Booking
// ============================================================================

/// Booking lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting operator approval
    Pending,
    /// Approved (or auto-approved) and counting against capacity
    Confirmed,
    /// Cancelled by the hunter after confirmation
    Cancelled,
    /// Declined by the operator
    Rejected,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A hunter's reservation of a field for one calendar day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier
    pub id: BookingId,
    /// Booked field
    pub field_id: FieldId,
    /// Booking hunter
    pub hunter_id: UserId,
    /// Calendar day of the hunt (no time component)
    pub date: NaiveDate,
    /// Hunters covered by this booking
    pub num_hunters: u32,
    /// Total price paid or payable
    pub total_price: Money,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// Gateway payment reference, if a payment was taken
    pub payment_ref: Option<PaymentRef>,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Hunt session
// ============================================================================

/// Hunt session lifecycle status (linear, no skipping, no rollback)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Materialized for today's booking, hunter not yet in the field
    NotStarted,
    /// Hunter has started the day
    Active,
    /// Hunt finished and reported; terminal
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// The live, timed occurrence of a hunter's visit on the booked date.
///
/// Exactly one session exists per booking, created lazily the first time
/// the hunter opens a confirmed booking dated today.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HuntSession {
    /// Unique session identifier
    pub id: SessionId,
    /// Parent booking (1:1)
    pub booking_id: BookingId,
    /// Hunter running the session
    pub hunter_id: UserId,
    /// Field being hunted
    pub field_id: FieldId,
    /// When the hunter started the day
    pub start_time: Option<DateTime<Utc>>,
    /// When the hunter ended the day
    pub end_time: Option<DateTime<Utc>>,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// When the session record was materialized
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Hunt report
// ============================================================================

/// One (species, quantity) pair harvested during a session.
///
/// These entries drive per-species quota depletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestEntry {
    /// Species name as tracked by the field's quota
    pub species: String,
    /// Number of animals taken
    pub quantity: u32,
}

/// Structured detail for a single harvested animal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalDetail {
    /// Species of the animal
    pub species: String,
    /// Observed condition (e.g. "Excellent", "Good", "Fair")
    pub condition: String,
    /// Disease observed on the carcass, if any
    pub disease: Option<String>,
    /// Physical tag number already attached in the field, if any
    pub physical_tag: Option<String>,
}

/// End-of-session record of what was harvested and observed.
///
/// Created exactly once per session; immutable except for the review
/// fields, which the hunter and administrators may edit later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HuntReport {
    /// Unique report identifier
    pub id: ReportId,
    /// Parent session (1:1)
    pub session_id: SessionId,
    /// Field the hunt took place on
    pub field_id: FieldId,
    /// Reporting hunter
    pub hunter_id: UserId,
    /// Total animals harvested (0 is a valid empty-handed hunt)
    pub animals_harvested: u32,
    /// Per-species harvest quantities
    pub species_harvested: Vec<HarvestEntry>,
    /// Per-animal structured detail
    pub animals: Vec<AnimalDetail>,
    /// Free-text remarks about the ground itself
    pub ground_remarks: Option<String>,
    /// Weather during the hunt
    pub weather_conditions: Option<String>,
    /// Hours spent in the field
    pub time_spent_hours: Option<f32>,
    /// General notes
    pub notes: Option<String>,
    /// Whether any animal was harvested
    pub success: bool,
    /// Review rating, 1-5
    pub review_rating: Option<u8>,
    /// Review text
    pub review_text: Option<String>,
    /// When the report was filed
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Animal tag
// ============================================================================

/// Traceability record for one harvested animal: a unique tag number,
/// a photo and a scannable code resolving to the public verification
/// surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalTag {
    /// Unique record identifier
    pub id: TagId,
    /// Globally unique tag number, never reused
    pub tag_number: TagNumber,
    /// Report this animal belongs to
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
    /// When the tag was issued
    pub created_at: DateTime<Utc>,
}
