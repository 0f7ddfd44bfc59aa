//! In-memory [`PlatformStore`] implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use fieldsport_core::availability;
use fieldsport_core::error::{PlatformError, Result};
use fieldsport_core::session::ensure_session_can_materialize;
use fieldsport_core::store::{NewAnimalTag, PlatformStore};
use fieldsport_core::types::{
    AnimalTag, Booking, BookingId, BookingStatus, Field, FieldId, HuntReport, HuntSession,
    LastVisit, ReportId, SessionId, SessionStatus, TagId, TagNumber, User, UserId,
};
use fieldsport_core::{Clock, NewBooking, NewHuntReport, ReviewUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    fields: HashMap<FieldId, Field>,
    bookings: HashMap<BookingId, Booking>,
    sessions: HashMap<SessionId, HuntSession>,
    reports: HashMap<ReportId, HuntReport>,
    tags: HashMap<TagId, AnimalTag>,
}

/// Deterministic in-memory store. One mutex over the whole state
/// serializes every check-then-act operation, which is the same
/// guarantee the production store gets from database row locks.
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Creates an empty store driven by the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    /// Seeds a directory user (user management is external in
    /// production; tests plant the records they need).
    pub fn insert_user(&self, user: User) -> Result<()> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    /// Seeds a field.
    pub fn insert_field(&self, field: Field) -> Result<()> {
        self.lock()?.fields.insert(field.id, field);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| PlatformError::Persistence("state lock poisoned".to_string()))
    }
}

/// Sum of hunters already booked (pending or confirmed) on a field+date.
fn committed_hunters(state: &State, field_id: FieldId, date: NaiveDate) -> u32 {
    state
        .bookings
        .values()
        .filter(|b| b.field_id == field_id && b.date == date && b.status.is_active())
        .map(|b| b.num_hunters)
        .sum()
}

/// The hunter's active booking on a date, anywhere on the platform.
fn active_booking_on_date<'a>(
    state: &'a State,
    hunter_id: UserId,
    date: NaiveDate,
) -> Option<&'a Booking> {
    state
        .bookings
        .values()
        .find(|b| b.hunter_id == hunter_id && b.date == date && b.status.is_active())
}

fn report_for_session(state: &State, session_id: SessionId) -> Option<&HuntReport> {
    state.reports.values().find(|r| r.session_id == session_id)
}

#[async_trait]
impl PlatformStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<User> {
        self.lock()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("user", id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("user", email))
    }

    async fn get_field(&self, id: FieldId) -> Result<Field> {
        self.lock()?
            .fields
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("field", id))
    }

    async fn list_fields(&self) -> Result<Vec<Field>> {
        let mut fields: Vec<Field> = self.lock()?.fields.values().cloned().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fields)
    }

    async fn check_availability(
        &self,
        field_id: FieldId,
        date: NaiveDate,
        num_hunters: u32,
    ) -> Result<()> {
        let state = self.lock()?;
        let field = state
            .fields
            .get(&field_id)
            .ok_or_else(|| PlatformError::not_found("field", field_id))?;
        let committed = committed_hunters(&state, field_id, date);
        availability::evaluate(field, date, committed, num_hunters)
    }

    async fn create_booking(&self, new: NewBooking) -> Result<Booking> {
        new.validate()?;
        let mut state = self.lock()?;

        let field = state
            .fields
            .get(&new.field_id)
            .ok_or_else(|| PlatformError::not_found("field", new.field_id))?;

        if !new.admin_override {
            if let Some(existing) = active_booking_on_date(&state, new.hunter_id, new.date) {
                let field_name = state
                    .fields
                    .get(&existing.field_id)
                    .map_or_else(|| "another field".to_string(), |f| f.name.clone());
                return Err(PlatformError::DoubleBooking {
                    date: new.date,
                    field_name,
                });
            }
            let committed = committed_hunters(&state, new.field_id, new.date);
            availability::evaluate(field, new.date, committed, new.num_hunters)?;
        }

        let booking = Booking {
            id: BookingId::new(),
            field_id: new.field_id,
            hunter_id: new.hunter_id,
            date: new.date,
            num_hunters: new.num_hunters,
            total_price: new.total_price,
            status: BookingStatus::initial(field.auto_approve_bookings),
            payment_ref: new.payment_ref,
            created_at: self.clock.now(),
        };
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        self.lock()?
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("booking", id))
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        to: BookingStatus,
        force: bool,
    ) -> Result<Booking> {
        let mut state = self.lock()?;
        let booking = state
            .bookings
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found("booking", id))?;
        if !force && !booking.status.can_transition(to) {
            return Err(PlatformError::InvalidSequence(format!(
                "booking cannot move from {} to {to}",
                booking.status
            )));
        }
        booking.status = to;
        Ok(booking.clone())
    }

    async fn bookings_by_hunter(&self, hunter_id: UserId) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.hunter_id == hunter_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn bookings_by_field(&self, field_id: FieldId) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.field_id == field_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn todays_confirmed_bookings(&self, hunter_id: UserId) -> Result<Vec<Booking>> {
        let today = self.clock.today();
        let state = self.lock()?;
        Ok(state
            .bookings
            .values()
            .filter(|b| {
                b.hunter_id == hunter_id
                    && b.date == today
                    && b.status == BookingStatus::Confirmed
            })
            .cloned()
            .collect())
    }

    async fn find_or_create_session(&self, booking_id: BookingId) -> Result<HuntSession> {
        let mut state = self.lock()?;
        if let Some(existing) = state
            .sessions
            .values()
            .find(|s| s.booking_id == booking_id)
        {
            return Ok(existing.clone());
        }

        let booking = state
            .bookings
            .get(&booking_id)
            .ok_or_else(|| PlatformError::not_found("booking", booking_id))?;
        ensure_session_can_materialize(booking, self.clock.today())?;

        let session = HuntSession {
            id: SessionId::new(),
            booking_id,
            hunter_id: booking.hunter_id,
            field_id: booking.field_id,
            start_time: None,
            end_time: None,
            status: SessionStatus::NotStarted,
            created_at: self.clock.now(),
        };
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<HuntSession> {
        self.lock()?
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("hunt session", id))
    }

    async fn start_session(&self, id: SessionId) -> Result<HuntSession> {
        let mut state = self.lock()?;
        let session = state
            .sessions
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found("hunt session", id))?;
        if !session.status.can_start() {
            return Err(PlatformError::InvalidSequence(format!(
                "cannot start a session that is {}",
                session.status
            )));
        }
        session.status = SessionStatus::Active;
        session.start_time = Some(self.clock.now());
        Ok(session.clone())
    }

    async fn end_session(&self, id: SessionId) -> Result<HuntSession> {
        let mut state = self.lock()?;
        let session = state
            .sessions
            .get(&id)
            .ok_or_else(|| PlatformError::not_found("hunt session", id))?;
        if !session.status.can_end() {
            return Err(PlatformError::InvalidSequence(format!(
                "cannot end a session that is {}",
                session.status
            )));
        }
        if report_for_session(&state, id).is_none() {
            return Err(PlatformError::InvalidSequence(
                "a hunt report must be filed before the session ends".to_string(),
            ));
        }
        let now = self.clock.now();
        // Re-borrow mutably after the report existence check.
        let session = state
            .sessions
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found("hunt session", id))?;
        session.status = SessionStatus::Completed;
        session.end_time = Some(now);
        Ok(session.clone())
    }

    async fn session_by_booking(&self, booking_id: BookingId) -> Result<Option<HuntSession>> {
        Ok(self
            .lock()?
            .sessions
            .values()
            .find(|s| s.booking_id == booking_id)
            .cloned())
    }

    async fn sessions_by_hunter(&self, hunter_id: UserId) -> Result<Vec<HuntSession>> {
        let state = self.lock()?;
        let mut sessions: Vec<HuntSession> = state
            .sessions
            .values()
            .filter(|s| s.hunter_id == hunter_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn sessions_by_field(&self, field_id: FieldId) -> Result<Vec<HuntSession>> {
        let state = self.lock()?;
        let mut sessions: Vec<HuntSession> = state
            .sessions
            .values()
            .filter(|s| s.field_id == field_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create_hunt_report(&self, new: NewHuntReport) -> Result<HuntReport> {
        new.validate()?;
        let mut state = self.lock()?;

        let session = state
            .sessions
            .get(&new.session_id)
            .ok_or_else(|| PlatformError::not_found("hunt session", new.session_id))?;
        if !session.status.can_report() {
            return Err(PlatformError::InvalidSequence(format!(
                "cannot file a report against a session that is {}",
                session.status
            )));
        }
        if session.field_id != new.field_id || session.hunter_id != new.hunter_id {
            return Err(PlatformError::InvalidInput(
                "report field/hunter do not match the session".to_string(),
            ));
        }
        if report_for_session(&state, new.session_id).is_some() {
            return Err(PlatformError::InvalidSequence(
                "a report has already been filed for this session".to_string(),
            ));
        }

        // Report insert and quota depletion are one atomic step: the
        // state mutex is held across both.
        let today = self.clock.today();
        let had_harvest = new.animals_harvested > 0;
        let field = state
            .fields
            .get_mut(&new.field_id)
            .ok_or_else(|| PlatformError::not_found("field", new.field_id))?;
        if had_harvest {
            field
                .quota
                .apply_harvest(new.animals_harvested, &new.species_harvested);
        }
        field.last_visit = Some(LastVisit {
            date: today,
            had_harvest,
        });

        let report = HuntReport {
            id: ReportId::new(),
            session_id: new.session_id,
            field_id: new.field_id,
            hunter_id: new.hunter_id,
            animals_harvested: new.animals_harvested,
            species_harvested: new.species_harvested,
            animals: new.animals,
            ground_remarks: new.ground_remarks,
            weather_conditions: new.weather_conditions,
            time_spent_hours: new.time_spent_hours,
            notes: new.notes,
            success: had_harvest,
            review_rating: new.review_rating,
            review_text: new.review_text,
            created_at: self.clock.now(),
        };
        state.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn update_hunt_report(&self, id: ReportId, review: ReviewUpdate) -> Result<HuntReport> {
        review.validate()?;
        let mut state = self.lock()?;
        let report = state
            .reports
            .get_mut(&id)
            .ok_or_else(|| PlatformError::not_found("hunt report", id))?;
        if let Some(rating) = review.rating {
            report.review_rating = Some(rating);
        }
        if let Some(text) = review.text {
            report.review_text = Some(text);
        }
        Ok(report.clone())
    }

    async fn get_report(&self, id: ReportId) -> Result<HuntReport> {
        self.lock()?
            .reports
            .get(&id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("hunt report", id))
    }

    async fn report_by_session(&self, session_id: SessionId) -> Result<Option<HuntReport>> {
        let state = self.lock()?;
        Ok(report_for_session(&state, session_id).cloned())
    }

    async fn reports_by_field(&self, field_id: FieldId) -> Result<Vec<HuntReport>> {
        let state = self.lock()?;
        let mut reports: Vec<HuntReport> = state
            .reports
            .values()
            .filter(|r| r.field_id == field_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn create_animal_tag(&self, new: NewAnimalTag) -> Result<AnimalTag> {
        let mut state = self.lock()?;
        if !state.reports.contains_key(&new.report_id) {
            return Err(PlatformError::not_found("hunt report", new.report_id));
        }
        if state
            .tags
            .values()
            .any(|t| t.tag_number == new.tag_number)
        {
            return Err(PlatformError::Persistence(format!(
                "tag number {} already issued",
                new.tag_number
            )));
        }
        let tag = AnimalTag {
            id: new.id,
            tag_number: new.tag_number,
            report_id: new.report_id,
            hunter_id: new.hunter_id,
            field_id: new.field_id,
            species: new.species,
            condition: new.condition,
            photo_key: new.photo_key,
            scan_code_key: new.scan_code_key,
            physical_tag: new.physical_tag,
            disease: new.disease,
            notes: new.notes,
            created_at: self.clock.now(),
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn tag_by_number(&self, number: &TagNumber) -> Result<Option<AnimalTag>> {
        Ok(self
            .lock()?
            .tags
            .values()
            .find(|t| &t.tag_number == number)
            .cloned())
    }

    async fn tags_by_report(&self, report_id: ReportId) -> Result<Vec<AnimalTag>> {
        let state = self.lock()?;
        let mut tags: Vec<AnimalTag> = state
            .tags
            .values()
            .filter(|t| t.report_id == report_id)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tags)
    }

    async fn tags_by_hunter(&self, hunter_id: UserId) -> Result<Vec<AnimalTag>> {
        let state = self.lock()?;
        let mut tags: Vec<AnimalTag> = state
            .tags
            .values()
            .filter(|t| t.hunter_id == hunter_id)
            .cloned()
            .collect();
        tags.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tags)
    }
}
