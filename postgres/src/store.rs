//! `PlatformStore` implementation over PostgreSQL.

use crate::rows::{BookingRow, FieldRow, ReportRow, SessionRow, TagRow, UserRow};
use crate::PostgresStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use fieldsport_core::availability;
use fieldsport_core::error::{PlatformError, Result};
use fieldsport_core::session::ensure_session_can_materialize;
use fieldsport_core::store::{NewAnimalTag, PlatformStore};
use fieldsport_core::types::{
    AnimalTag, Booking, BookingId, BookingStatus, Field, FieldId, HuntReport, HuntSession,
    LastVisit, ReportId, SessionId, SessionStatus, TagNumber, User, UserId,
};
use fieldsport_core::{NewBooking, NewHuntReport, ReviewUpdate};
use sqlx::types::Json;
use sqlx::PgConnection;

const BOOKING_COLS: &str = "id, field_id, hunter_id, hunt_date, num_hunters, \
     total_price_pence, status, payment_ref, created_at";
const FIELD_COLS: &str = "id, name, owner_id, location, field_type, capacity, \
     price_per_day_pence, blocked_dates, quota, auto_approve_bookings, \
     last_visit_date, last_visit_had_harvest, created_at";
const SESSION_COLS: &str = "id, booking_id, hunter_id, field_id, start_time, \
     end_time, status, created_at";
const REPORT_COLS: &str = "id, session_id, field_id, hunter_id, animals_harvested, \
     species_harvested, animals, ground_remarks, weather_conditions, \
     time_spent_hours, notes, success, review_rating, review_text, created_at";
const TAG_COLS: &str = "id, tag_number, report_id, hunter_id, field_id, species, \
     condition, photo_key, scan_code_key, physical_tag, disease, notes, created_at";

fn storage(context: &'static str) -> impl Fn(sqlx::Error) -> PlatformError {
    move |e| PlatformError::Persistence(format!("{context}: {e}"))
}

fn db_count(value: u32, what: &'static str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| PlatformError::InvalidInput(format!("{what} out of range: {value}")))
}

fn db_pence(value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| PlatformError::InvalidInput(format!("price out of range: {value}")))
}

/// Loads a field row, locking it for the rest of the transaction.
async fn field_for_update(conn: &mut PgConnection, id: FieldId) -> Result<Field> {
    let sql = format!("SELECT {FIELD_COLS} FROM fields WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, FieldRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(storage("failed to lock field"))?
        .ok_or_else(|| PlatformError::not_found("field", id))?
        .try_into()
}

/// Loads a session row, locking it for the rest of the transaction.
async fn session_for_update(conn: &mut PgConnection, id: SessionId) -> Result<HuntSession> {
    let sql = format!("SELECT {SESSION_COLS} FROM hunt_sessions WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, SessionRow>(&sql)
        .bind(id.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(storage("failed to lock hunt session"))?
        .ok_or_else(|| PlatformError::not_found("hunt session", id))?
        .try_into()
}

/// Sum of hunters already booked (pending or confirmed) on a field+date.
async fn committed_hunters(
    conn: &mut PgConnection,
    field_id: FieldId,
    date: NaiveDate,
) -> Result<u32> {
    let committed: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(num_hunters), 0)
         FROM bookings
         WHERE field_id = $1 AND hunt_date = $2
           AND status IN ('pending', 'confirmed')",
    )
    .bind(field_id.as_uuid())
    .bind(date)
    .fetch_one(conn)
    .await
    .map_err(storage("failed to sum booked hunters"))?;
    Ok(u32::try_from(committed).unwrap_or(u32::MAX))
}

/// Name of the field holding the hunter's active booking on `date`,
/// anywhere on the platform.
async fn conflicting_field_name(
    conn: &mut PgConnection,
    hunter_id: UserId,
    date: NaiveDate,
) -> Result<Option<String>> {
    sqlx::query_scalar(
        "SELECT f.name
         FROM bookings b
         JOIN fields f ON f.id = b.field_id
         WHERE b.hunter_id = $1 AND b.hunt_date = $2
           AND b.status IN ('pending', 'confirmed')
         LIMIT 1",
    )
    .bind(hunter_id.as_uuid())
    .bind(date)
    .fetch_optional(conn)
    .await
    .map_err(storage("failed to check for an existing booking"))
}

async fn report_exists(conn: &mut PgConnection, session_id: SessionId) -> Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM hunt_reports WHERE session_id = $1)")
        .bind(session_id.as_uuid())
        .fetch_one(conn)
        .await
        .map_err(storage("failed to check for an existing report"))
}

#[async_trait]
impl PlatformStore for PostgresStore {
    async fn get_user(&self, id: UserId) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, phone, location FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(storage("failed to query user"))?
        .map(User::from)
        .ok_or_else(|| PlatformError::not_found("user", id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, phone, location FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(storage("failed to query user"))?
        .map(User::from)
        .ok_or_else(|| PlatformError::not_found("user", email))
    }

    async fn get_field(&self, id: FieldId) -> Result<Field> {
        let sql = format!("SELECT {FIELD_COLS} FROM fields WHERE id = $1");
        sqlx::query_as::<_, FieldRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query field"))?
            .ok_or_else(|| PlatformError::not_found("field", id))?
            .try_into()
    }

    async fn list_fields(&self) -> Result<Vec<Field>> {
        let sql = format!("SELECT {FIELD_COLS} FROM fields ORDER BY name");
        let rows = sqlx::query_as::<_, FieldRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to list fields"))?;
        rows.into_iter().map(Field::try_from).collect()
    }

    async fn check_availability(
        &self,
        field_id: FieldId,
        date: NaiveDate,
        num_hunters: u32,
    ) -> Result<()> {
        let field = self.get_field(field_id).await?;
        let mut conn = self
            .pool()
            .acquire()
            .await
            .map_err(storage("failed to acquire a connection"))?;
        let committed = committed_hunters(&mut conn, field_id, date).await?;
        availability::evaluate(&field, date, committed, num_hunters)
    }

    #[tracing::instrument(
        skip(self, new),
        fields(field_id = %new.field_id, hunter_id = %new.hunter_id, date = %new.date)
    )]
    async fn create_booking(&self, new: NewBooking) -> Result<Booking> {
        new.validate()?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        // Lock the hunter row, then the field row (always in that order),
        // serializing concurrent bookings on the (hunter, date) and
        // (field, date) keys for the duration of check + insert.
        let hunter_row: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(new.hunter_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage("failed to lock hunter"))?;
        if hunter_row.is_none() {
            return Err(PlatformError::not_found("user", new.hunter_id));
        }
        let field = field_for_update(&mut tx, new.field_id).await?;

        if !new.admin_override {
            if let Some(field_name) =
                conflicting_field_name(&mut tx, new.hunter_id, new.date).await?
            {
                return Err(PlatformError::DoubleBooking {
                    date: new.date,
                    field_name,
                });
            }
            let committed = committed_hunters(&mut tx, new.field_id, new.date).await?;
            availability::evaluate(&field, new.date, committed, new.num_hunters)?;
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
        sqlx::query(
            "INSERT INTO bookings
                 (id, field_id, hunter_id, hunt_date, num_hunters,
                  total_price_pence, status, payment_ref, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.field_id.as_uuid())
        .bind(booking.hunter_id.as_uuid())
        .bind(booking.date)
        .bind(db_count(booking.num_hunters, "hunter count")?)
        .bind(db_pence(booking.total_price.pence())?)
        .bind(booking.status.to_string())
        .bind(booking.payment_ref.as_ref().map(|p| p.as_str().to_string()))
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage("failed to insert booking"))?;

        tx.commit()
            .await
            .map_err(storage("failed to commit booking"))?;
        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        let sql = format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query booking"))?
            .ok_or_else(|| PlatformError::not_found("booking", id))?
            .try_into()
    }

    #[tracing::instrument(skip(self), fields(booking_id = %id, to = %to))]
    async fn update_booking_status(
        &self,
        id: BookingId,
        to: BookingStatus,
        force: bool,
    ) -> Result<Booking> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        let sql = format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = $1 FOR UPDATE");
        let mut booking: Booking = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage("failed to lock booking"))?
            .ok_or_else(|| PlatformError::not_found("booking", id))?
            .try_into()?;

        if !force && !booking.status.can_transition(to) {
            return Err(PlatformError::InvalidSequence(format!(
                "booking cannot move from {} to {to}",
                booking.status
            )));
        }

        sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(to.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage("failed to update booking status"))?;
        tx.commit()
            .await
            .map_err(storage("failed to commit status update"))?;

        booking.status = to;
        Ok(booking)
    }

    async fn bookings_by_hunter(&self, hunter_id: UserId) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE hunter_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(hunter_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query bookings"))?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn bookings_by_field(&self, field_id: FieldId) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE field_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(field_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query bookings"))?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn todays_confirmed_bookings(&self, hunter_id: UserId) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLS} FROM bookings
             WHERE hunter_id = $1 AND hunt_date = $2 AND status = 'confirmed'"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(hunter_id.as_uuid())
            .bind(self.clock.today())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query today's bookings"))?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(booking_id = %booking_id))]
    async fn find_or_create_session(&self, booking_id: BookingId) -> Result<HuntSession> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        // Lock the booking row so two concurrent first visits cannot
        // both materialize a session; the UNIQUE(booking_id) constraint
        // is the backstop.
        let sql = format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = $1 FOR UPDATE");
        let booking: Booking = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage("failed to lock booking"))?
            .ok_or_else(|| PlatformError::not_found("booking", booking_id))?
            .try_into()?;

        let sql = format!("SELECT {SESSION_COLS} FROM hunt_sessions WHERE booking_id = $1");
        if let Some(existing) = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(booking_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage("failed to query session"))?
        {
            return existing.try_into();
        }

        ensure_session_can_materialize(&booking, self.clock.today())?;

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
        sqlx::query(
            "INSERT INTO hunt_sessions
                 (id, booking_id, hunter_id, field_id, start_time, end_time, status, created_at)
             VALUES ($1, $2, $3, $4, NULL, NULL, $5, $6)",
        )
        .bind(session.id.as_uuid())
        .bind(session.booking_id.as_uuid())
        .bind(session.hunter_id.as_uuid())
        .bind(session.field_id.as_uuid())
        .bind(session.status.to_string())
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage("failed to insert session"))?;
        tx.commit()
            .await
            .map_err(storage("failed to commit session"))?;
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<HuntSession> {
        let sql = format!("SELECT {SESSION_COLS} FROM hunt_sessions WHERE id = $1");
        sqlx::query_as::<_, SessionRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query session"))?
            .ok_or_else(|| PlatformError::not_found("hunt session", id))?
            .try_into()
    }

    #[tracing::instrument(skip(self), fields(session_id = %id))]
    async fn start_session(&self, id: SessionId) -> Result<HuntSession> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        let mut session = session_for_update(&mut tx, id).await?;
        if !session.status.can_start() {
            return Err(PlatformError::InvalidSequence(format!(
                "cannot start a session that is {}",
                session.status
            )));
        }

        let now = self.clock.now();
        sqlx::query("UPDATE hunt_sessions SET status = 'active', start_time = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage("failed to start session"))?;
        tx.commit()
            .await
            .map_err(storage("failed to commit session start"))?;

        session.status = SessionStatus::Active;
        session.start_time = Some(now);
        Ok(session)
    }

    #[tracing::instrument(skip(self), fields(session_id = %id))]
    async fn end_session(&self, id: SessionId) -> Result<HuntSession> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        let mut session = session_for_update(&mut tx, id).await?;
        if !session.status.can_end() {
            return Err(PlatformError::InvalidSequence(format!(
                "cannot end a session that is {}",
                session.status
            )));
        }
        // The report must be filed first; checked in the same
        // transaction that flips the status.
        if !report_exists(&mut tx, id).await? {
            return Err(PlatformError::InvalidSequence(
                "a hunt report must be filed before the session ends".to_string(),
            ));
        }

        let now = self.clock.now();
        sqlx::query("UPDATE hunt_sessions SET status = 'completed', end_time = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(storage("failed to end session"))?;
        tx.commit()
            .await
            .map_err(storage("failed to commit session end"))?;

        session.status = SessionStatus::Completed;
        session.end_time = Some(now);
        Ok(session)
    }

    async fn session_by_booking(&self, booking_id: BookingId) -> Result<Option<HuntSession>> {
        let sql = format!("SELECT {SESSION_COLS} FROM hunt_sessions WHERE booking_id = $1");
        sqlx::query_as::<_, SessionRow>(&sql)
            .bind(booking_id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query session"))?
            .map(HuntSession::try_from)
            .transpose()
    }

    async fn sessions_by_hunter(&self, hunter_id: UserId) -> Result<Vec<HuntSession>> {
        let sql = format!(
            "SELECT {SESSION_COLS} FROM hunt_sessions
             WHERE hunter_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(hunter_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query sessions"))?;
        rows.into_iter().map(HuntSession::try_from).collect()
    }

    async fn sessions_by_field(&self, field_id: FieldId) -> Result<Vec<HuntSession>> {
        let sql = format!(
            "SELECT {SESSION_COLS} FROM hunt_sessions
             WHERE field_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, SessionRow>(&sql)
            .bind(field_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query sessions"))?;
        rows.into_iter().map(HuntSession::try_from).collect()
    }

    #[tracing::instrument(skip(self, new), fields(session_id = %new.session_id))]
    async fn create_hunt_report(&self, new: NewHuntReport) -> Result<HuntReport> {
        new.validate()?;

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(storage("failed to start transaction"))?;

        let session = session_for_update(&mut tx, new.session_id).await?;
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
        if report_exists(&mut tx, new.session_id).await? {
            return Err(PlatformError::InvalidSequence(
                "a report has already been filed for this session".to_string(),
            ));
        }

        // Report insert and quota depletion commit or roll back together.
        let had_harvest = new.animals_harvested > 0;
        let mut field = field_for_update(&mut tx, new.field_id).await?;
        if had_harvest {
            field
                .quota
                .apply_harvest(new.animals_harvested, &new.species_harvested);
        }
        let last_visit = LastVisit {
            date: self.clock.today(),
            had_harvest,
        };
        sqlx::query(
            "UPDATE fields
             SET quota = $2, last_visit_date = $3, last_visit_had_harvest = $4
             WHERE id = $1",
        )
        .bind(field.id.as_uuid())
        .bind(Json(&field.quota))
        .bind(last_visit.date)
        .bind(last_visit.had_harvest)
        .execute(&mut *tx)
        .await
        .map_err(storage("failed to deplete quota"))?;

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
        sqlx::query(
            "INSERT INTO hunt_reports
                 (id, session_id, field_id, hunter_id, animals_harvested,
                  species_harvested, animals, ground_remarks, weather_conditions,
                  time_spent_hours, notes, success, review_rating, review_text, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(report.id.as_uuid())
        .bind(report.session_id.as_uuid())
        .bind(report.field_id.as_uuid())
        .bind(report.hunter_id.as_uuid())
        .bind(db_count(report.animals_harvested, "harvest count")?)
        .bind(Json(&report.species_harvested))
        .bind(Json(&report.animals))
        .bind(report.ground_remarks.as_deref())
        .bind(report.weather_conditions.as_deref())
        .bind(report.time_spent_hours)
        .bind(report.notes.as_deref())
        .bind(report.success)
        .bind(report.review_rating.map(i16::from))
        .bind(report.review_text.as_deref())
        .bind(report.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage("failed to insert report"))?;

        tx.commit()
            .await
            .map_err(storage("failed to commit report"))?;
        Ok(report)
    }

    async fn update_hunt_report(&self, id: ReportId, review: ReviewUpdate) -> Result<HuntReport> {
        review.validate()?;
        let sql = format!(
            "UPDATE hunt_reports
             SET review_rating = COALESCE($2, review_rating),
                 review_text = COALESCE($3, review_text)
             WHERE id = $1
             RETURNING {REPORT_COLS}"
        );
        sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id.as_uuid())
            .bind(review.rating.map(i16::from))
            .bind(review.text.as_deref())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to update review"))?
            .ok_or_else(|| PlatformError::not_found("hunt report", id))?
            .try_into()
    }

    async fn get_report(&self, id: ReportId) -> Result<HuntReport> {
        let sql = format!("SELECT {REPORT_COLS} FROM hunt_reports WHERE id = $1");
        sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query report"))?
            .ok_or_else(|| PlatformError::not_found("hunt report", id))?
            .try_into()
    }

    async fn report_by_session(&self, session_id: SessionId) -> Result<Option<HuntReport>> {
        let sql = format!("SELECT {REPORT_COLS} FROM hunt_reports WHERE session_id = $1");
        sqlx::query_as::<_, ReportRow>(&sql)
            .bind(session_id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query report"))?
            .map(HuntReport::try_from)
            .transpose()
    }

    async fn reports_by_field(&self, field_id: FieldId) -> Result<Vec<HuntReport>> {
        let sql = format!(
            "SELECT {REPORT_COLS} FROM hunt_reports
             WHERE field_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(field_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query reports"))?;
        rows.into_iter().map(HuntReport::try_from).collect()
    }

    #[tracing::instrument(skip(self, new), fields(report_id = %new.report_id, tag = %new.tag_number))]
    async fn create_animal_tag(&self, new: NewAnimalTag) -> Result<AnimalTag> {
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
        sqlx::query(
            "INSERT INTO animal_tags
                 (id, tag_number, report_id, hunter_id, field_id, species, condition,
                  photo_key, scan_code_key, physical_tag, disease, notes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(tag.id.as_uuid())
        .bind(tag.tag_number.as_str())
        .bind(tag.report_id.as_uuid())
        .bind(tag.hunter_id.as_uuid())
        .bind(tag.field_id.as_uuid())
        .bind(&tag.species)
        .bind(&tag.condition)
        .bind(tag.photo_key.as_deref())
        .bind(&tag.scan_code_key)
        .bind(tag.physical_tag.as_deref())
        .bind(tag.disease.as_deref())
        .bind(tag.notes.as_deref())
        .bind(tag.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return PlatformError::not_found("hunt report", tag.report_id);
                }
                if db_err.is_unique_violation() {
                    return PlatformError::Persistence(format!(
                        "tag number {} already issued",
                        tag.tag_number
                    ));
                }
            }
            PlatformError::Persistence(format!("failed to insert tag: {e}"))
        })?;
        Ok(tag)
    }

    async fn tag_by_number(&self, number: &TagNumber) -> Result<Option<AnimalTag>> {
        let sql = format!("SELECT {TAG_COLS} FROM animal_tags WHERE tag_number = $1");
        let row = sqlx::query_as::<_, TagRow>(&sql)
            .bind(number.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(storage("failed to query tag"))?;
        Ok(row.map(AnimalTag::from))
    }

    async fn tags_by_report(&self, report_id: ReportId) -> Result<Vec<AnimalTag>> {
        let sql = format!(
            "SELECT {TAG_COLS} FROM animal_tags WHERE report_id = $1 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, TagRow>(&sql)
            .bind(report_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query tags"))?;
        Ok(rows.into_iter().map(AnimalTag::from).collect())
    }

    async fn tags_by_hunter(&self, hunter_id: UserId) -> Result<Vec<AnimalTag>> {
        let sql = format!(
            "SELECT {TAG_COLS} FROM animal_tags WHERE hunter_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, TagRow>(&sql)
            .bind(hunter_id.as_uuid())
            .fetch_all(self.pool())
            .await
            .map_err(storage("failed to query tags"))?;
        Ok(rows.into_iter().map(AnimalTag::from).collect())
    }
}
