//! Row types and conversions between SQL rows and domain entities.
//!
//! Status and field-type columns are stored as their canonical text
//! forms; nested values travel as JSONB through `sqlx::types::Json`.

use chrono::{DateTime, NaiveDate, Utc};
use fieldsport_core::error::{PlatformError, Result};
use fieldsport_core::types::{
    AnimalDetail, AnimalTag, Booking, BookingId, BookingStatus, Capacity, Field, FieldId,
    FieldType, HarvestEntry, HuntReport, HuntSession, LastVisit, Money, PaymentRef, ReportId,
    SessionId, SessionStatus, TagId, TagNumber, User, UserId,
};
use fieldsport_core::Quota;
use sqlx::types::Json;
use uuid::Uuid;

pub(crate) fn parse_booking_status(raw: &str) -> Result<BookingStatus> {
    match raw {
        "pending" => Ok(BookingStatus::Pending),
        "confirmed" => Ok(BookingStatus::Confirmed),
        "cancelled" => Ok(BookingStatus::Cancelled),
        "rejected" => Ok(BookingStatus::Rejected),
        other => Err(PlatformError::Persistence(format!(
            "unknown booking status in storage: {other}"
        ))),
    }
}

pub(crate) fn parse_session_status(raw: &str) -> Result<SessionStatus> {
    match raw {
        "not_started" => Ok(SessionStatus::NotStarted),
        "active" => Ok(SessionStatus::Active),
        "completed" => Ok(SessionStatus::Completed),
        other => Err(PlatformError::Persistence(format!(
            "unknown session status in storage: {other}"
        ))),
    }
}

pub(crate) fn parse_field_type(raw: &str) -> Result<FieldType> {
    match raw {
        "diy-leased" => Ok(FieldType::DiyLeased),
        "subsidised" => Ok(FieldType::Subsidised),
        "international" => Ok(FieldType::International),
        other => Err(PlatformError::Persistence(format!(
            "unknown field type in storage: {other}"
        ))),
    }
}

fn count_from_db(raw: i32, what: &str) -> Result<u32> {
    u32::try_from(raw)
        .map_err(|_| PlatformError::Persistence(format!("negative {what} in storage: {raw}")))
}

fn pence_from_db(raw: i64, what: &str) -> Result<Money> {
    u64::try_from(raw)
        .map(Money::from_pence)
        .map_err(|_| PlatformError::Persistence(format!("negative {what} in storage: {raw}")))
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            phone: row.phone,
            location: row.location,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct FieldRow {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub location: String,
    pub field_type: String,
    pub capacity: i32,
    pub price_per_day_pence: i64,
    pub blocked_dates: Json<Vec<NaiveDate>>,
    pub quota: Json<Quota>,
    pub auto_approve_bookings: bool,
    pub last_visit_date: Option<NaiveDate>,
    pub last_visit_had_harvest: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FieldRow> for Field {
    type Error = PlatformError;

    fn try_from(row: FieldRow) -> Result<Self> {
        let last_visit = match (row.last_visit_date, row.last_visit_had_harvest) {
            (Some(date), Some(had_harvest)) => Some(LastVisit { date, had_harvest }),
            _ => None,
        };
        Ok(Self {
            id: FieldId::from_uuid(row.id),
            name: row.name,
            owner_id: UserId::from_uuid(row.owner_id),
            location: row.location,
            field_type: parse_field_type(&row.field_type)?,
            capacity: Capacity::new(count_from_db(row.capacity, "capacity")?),
            price_per_day: pence_from_db(row.price_per_day_pence, "price")?,
            blocked_dates: row.blocked_dates.0.into_iter().collect(),
            quota: row.quota.0,
            auto_approve_bookings: row.auto_approve_bookings,
            last_visit,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub field_id: Uuid,
    pub hunter_id: Uuid,
    pub hunt_date: NaiveDate,
    pub num_hunters: i32,
    pub total_price_pence: i64,
    pub status: String,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = PlatformError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Self {
            id: BookingId::from_uuid(row.id),
            field_id: FieldId::from_uuid(row.field_id),
            hunter_id: UserId::from_uuid(row.hunter_id),
            date: row.hunt_date,
            num_hunters: count_from_db(row.num_hunters, "hunter count")?,
            total_price: pence_from_db(row.total_price_pence, "price")?,
            status: parse_booking_status(&row.status)?,
            payment_ref: row.payment_ref.map(PaymentRef::new),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub hunter_id: Uuid,
    pub field_id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for HuntSession {
    type Error = PlatformError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Self {
            id: SessionId::from_uuid(row.id),
            booking_id: BookingId::from_uuid(row.booking_id),
            hunter_id: UserId::from_uuid(row.hunter_id),
            field_id: FieldId::from_uuid(row.field_id),
            start_time: row.start_time,
            end_time: row.end_time,
            status: parse_session_status(&row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub field_id: Uuid,
    pub hunter_id: Uuid,
    pub animals_harvested: i32,
    pub species_harvested: Json<Vec<HarvestEntry>>,
    pub animals: Json<Vec<AnimalDetail>>,
    pub ground_remarks: Option<String>,
    pub weather_conditions: Option<String>,
    pub time_spent_hours: Option<f32>,
    pub notes: Option<String>,
    pub success: bool,
    pub review_rating: Option<i16>,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for HuntReport {
    type Error = PlatformError;

    fn try_from(row: ReportRow) -> Result<Self> {
        let review_rating = row
            .review_rating
            .map(|r| {
                u8::try_from(r).map_err(|_| {
                    PlatformError::Persistence(format!("review rating out of range: {r}"))
                })
            })
            .transpose()?;
        Ok(Self {
            id: ReportId::from_uuid(row.id),
            session_id: SessionId::from_uuid(row.session_id),
            field_id: FieldId::from_uuid(row.field_id),
            hunter_id: UserId::from_uuid(row.hunter_id),
            animals_harvested: count_from_db(row.animals_harvested, "harvest count")?,
            species_harvested: row.species_harvested.0,
            animals: row.animals.0,
            ground_remarks: row.ground_remarks,
            weather_conditions: row.weather_conditions,
            time_spent_hours: row.time_spent_hours,
            notes: row.notes,
            success: row.success,
            review_rating,
            review_text: row.review_text,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub tag_number: String,
    pub report_id: Uuid,
    pub hunter_id: Uuid,
    pub field_id: Uuid,
    pub species: String,
    pub condition: String,
    pub photo_key: Option<String>,
    pub scan_code_key: String,
    pub physical_tag: Option<String>,
    pub disease: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TagRow> for AnimalTag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::from_uuid(row.id),
            tag_number: TagNumber::from_string(row.tag_number),
            report_id: ReportId::from_uuid(row.report_id),
            hunter_id: UserId::from_uuid(row.hunter_id),
            field_id: FieldId::from_uuid(row.field_id),
            species: row.species,
            condition: row.condition,
            photo_key: row.photo_key,
            scan_code_key: row.scan_code_key,
            physical_tag: row.physical_tag,
            disease: row.disease,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}
