use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::bookings::error::BookingError;
use crate::bookings::{Booking, DeletedBooking, PaymentMode, PaymentType};
use crate::models::SlotDefinition;

/// Column list shared by every booking query
const BOOKING_COLUMNS: &str = "id, event_date, customer_name, phone1, phone2, groom_name, \
     bride_name, address, occasion_type, notes, payment_type, advance_amount, payment_mode, \
     total_amount, balance_amount, created_at, updated_at";

/// Field values for inserting or replacing a booking row
///
/// Amounts arrive already resolved and locked in by the orchestrator.
#[derive(Debug, Clone)]
pub struct NewBookingRow {
    pub event_date: NaiveDate,
    pub customer_name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub groom_name: Option<String>,
    pub bride_name: Option<String>,
    pub address: String,
    pub occasion_type: String,
    pub notes: Option<String>,
    pub payment_type: PaymentType,
    pub advance_amount: Option<Decimal>,
    pub payment_mode: PaymentMode,
    pub total_amount: Decimal,
    pub balance_amount: Decimal,
    pub slot_ids: Vec<i32>,
}

/// True when the error is the unique-constraint violation raised by a losing
/// concurrent insert into booking_slots
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Repository for slot catalog lookups used by the booking flow
#[derive(Clone)]
pub struct SlotCatalogRepository {
    pool: PgPool,
}

impl SlotCatalogRepository {
    /// Create a new SlotCatalogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a slot definition by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<SlotDefinition>, BookingError> {
        let slot = sqlx::query_as::<_, SlotDefinition>(
            "SELECT id, label, time_range, base_price, created_at, updated_at FROM slots WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    /// Find multiple slot definitions by IDs, keyed by id
    pub async fn find_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, SlotDefinition>, BookingError> {
        let slots = sqlx::query_as::<_, SlotDefinition>(
            "SELECT id, label, time_range, base_price, created_at, updated_at FROM slots WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots.into_iter().map(|slot| (slot.id, slot)).collect())
    }

    /// All slot definitions in catalog order
    pub async fn list(&self) -> Result<Vec<SlotDefinition>, BookingError> {
        let slots = sqlx::query_as::<_, SlotDefinition>(
            "SELECT id, label, time_range, base_price, created_at, updated_at FROM slots ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}

/// Repository for the active booking collection
#[derive(Clone)]
pub struct BookingsRepository {
    pool: PgPool,
}

impl BookingsRepository {
    /// Create a new BookingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a booking and reserve its slots in one transaction
    ///
    /// The booking row and every booking_slots row commit together or not at
    /// all; a unique violation on (event_date, slot_id) means a concurrent
    /// booking won the race and surfaces as a Conflict.
    pub async fn create(&self, row: &NewBookingRow) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (event_date, customer_name, phone1, phone2, groom_name,
                bride_name, address, occasion_type, notes, payment_type, advance_amount,
                payment_mode, total_amount, balance_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(row.event_date)
        .bind(&row.customer_name)
        .bind(&row.phone1)
        .bind(&row.phone2)
        .bind(&row.groom_name)
        .bind(&row.bride_name)
        .bind(&row.address)
        .bind(&row.occasion_type)
        .bind(&row.notes)
        .bind(row.payment_type)
        .bind(row.advance_amount)
        .bind(row.payment_mode)
        .bind(row.total_amount)
        .bind(row.balance_amount)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_slot_rows(&mut tx, booking.id, row.event_date, &row.slot_ids).await?;

        tx.commit().await?;

        Ok(booking)
    }

    /// Replace a booking's fields and slot reservations in one transaction
    pub async fn update(&self, id: Uuid, row: &NewBookingRow) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET event_date = $1, customer_name = $2, phone1 = $3, phone2 = $4,
                groom_name = $5, bride_name = $6, address = $7, occasion_type = $8,
                notes = $9, payment_type = $10, advance_amount = $11, payment_mode = $12,
                total_amount = $13, balance_amount = $14, updated_at = NOW()
            WHERE id = $15
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(row.event_date)
        .bind(&row.customer_name)
        .bind(&row.phone1)
        .bind(&row.phone2)
        .bind(&row.groom_name)
        .bind(&row.bride_name)
        .bind(&row.address)
        .bind(&row.occasion_type)
        .bind(&row.notes)
        .bind(row.payment_type)
        .bind(row.advance_amount)
        .bind(row.payment_mode)
        .bind(row.total_amount)
        .bind(row.balance_amount)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::NotFound)?;

        sqlx::query("DELETE FROM booking_slots WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_slot_rows(&mut tx, id, row.event_date, &row.slot_ids).await?;

        tx.commit().await?;

        Ok(booking)
    }

    /// Move a booking to the archive
    ///
    /// Copies the row (with its slot-id array) into deleted_bookings and
    /// removes the live row, releasing its slots, in one transaction. The
    /// archive row is never touched again.
    pub async fn soft_delete(&self, id: Uuid) -> Result<DeletedBooking, BookingError> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::NotFound)?;

        let slot_ids: Vec<i32> = sqlx::query_scalar(
            "SELECT slot_id FROM booking_slots WHERE booking_id = $1 ORDER BY slot_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let archived = sqlx::query_as::<_, DeletedBooking>(
            r#"
            INSERT INTO deleted_bookings (original_booking_id, event_date, customer_name,
                phone1, phone2, groom_name, bride_name, address, occasion_type, notes,
                payment_type, advance_amount, payment_mode, total_amount, balance_amount,
                slot_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id, original_booking_id, event_date, customer_name, phone1, phone2,
                groom_name, bride_name, address, occasion_type, notes, payment_type,
                advance_amount, payment_mode, total_amount, balance_amount, slot_ids,
                created_at, updated_at, deleted_at
            "#,
        )
        .bind(booking.id)
        .bind(booking.event_date)
        .bind(&booking.customer_name)
        .bind(&booking.phone1)
        .bind(&booking.phone2)
        .bind(&booking.groom_name)
        .bind(&booking.bride_name)
        .bind(&booking.address)
        .bind(&booking.occasion_type)
        .bind(&booking.notes)
        .bind(booking.payment_type)
        .bind(booking.advance_amount)
        .bind(booking.payment_mode)
        .bind(booking.total_amount)
        .bind(booking.balance_amount)
        .bind(&slot_ids)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(archived)
    }

    /// Find a booking by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// All bookings on a date, oldest first
    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE event_date = $1 ORDER BY created_at",
            BOOKING_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Bookings in a date range with optional occasion/payment-type filters
    pub async fn find_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        occasion_type: Option<String>,
        payment_type: Option<PaymentType>,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE event_date BETWEEN $1 AND $2
              AND ($3::text IS NULL OR occasion_type ILIKE $3)
              AND ($4::text IS NULL OR payment_type = $4)
            ORDER BY event_date, created_at
            "#,
            BOOKING_COLUMNS
        ))
        .bind(from)
        .bind(to)
        .bind(occasion_type)
        .bind(payment_type.map(|p| p.as_str().to_string()))
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Slot ids reserved by a booking, ascending
    pub async fn slot_ids_for(&self, booking_id: Uuid) -> Result<Vec<i32>, BookingError> {
        let slot_ids: Vec<i32> = sqlx::query_scalar(
            "SELECT slot_id FROM booking_slots WHERE booking_id = $1 ORDER BY slot_id",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slot_ids)
    }

    async fn insert_slot_rows(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: Uuid,
        event_date: NaiveDate,
        slot_ids: &[i32],
    ) -> Result<(), BookingError> {
        for slot_id in slot_ids {
            sqlx::query(
                "INSERT INTO booking_slots (booking_id, event_date, slot_id) VALUES ($1, $2, $3)",
            )
            .bind(booking_id)
            .bind(event_date)
            .bind(slot_id)
            .execute(&mut **tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    BookingError::Conflict(format!(
                        "Slot {} was just booked on {} by another request",
                        slot_id, event_date
                    ))
                } else {
                    BookingError::from(err)
                }
            })?;
        }

        Ok(())
    }
}

/// Repository for the append-only booking archive
#[derive(Clone)]
pub struct ArchiveRepository {
    pool: PgPool,
}

impl ArchiveRepository {
    /// Create a new ArchiveRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Archived bookings whose event date falls in the range
    pub async fn find_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeletedBooking>, BookingError> {
        let archived = sqlx::query_as::<_, DeletedBooking>(
            r#"
            SELECT id, original_booking_id, event_date, customer_name, phone1, phone2,
                groom_name, bride_name, address, occasion_type, notes, payment_type,
                advance_amount, payment_mode, total_amount, balance_amount, slot_ids,
                created_at, updated_at, deleted_at
            FROM deleted_bookings
            WHERE event_date BETWEEN $1 AND $2
            ORDER BY deleted_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(archived)
    }

    /// Archived record for a specific original booking id
    pub async fn find_by_original_id(
        &self,
        original_booking_id: Uuid,
    ) -> Result<Option<DeletedBooking>, BookingError> {
        let archived = sqlx::query_as::<_, DeletedBooking>(
            r#"
            SELECT id, original_booking_id, event_date, customer_name, phone1, phone2,
                groom_name, bride_name, address, occasion_type, notes, payment_type,
                advance_amount, payment_mode, total_amount, balance_amount, slot_ids,
                created_at, updated_at, deleted_at
            FROM deleted_bookings
            WHERE original_booking_id = $1
            ORDER BY deleted_at DESC
            LIMIT 1
            "#,
        )
        .bind(original_booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(archived)
    }
}
