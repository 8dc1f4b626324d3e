// Availability index
//
// Derived view over the booking collection: which slot ids are held on a
// given date. Always computed from active bookings, never stored as its own
// source of truth. Date-level openness (no new bookings on past dates) is a
// separate rule layered on top of slot-level availability.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashSet;

/// Per-slot availability entry for one date, as rendered by the calendar UI
#[derive(Debug, Serialize)]
pub struct SlotAvailability {
    pub slot_id: i32,
    pub label: String,
    pub time_range: String,
    /// Price applicable to an event on this date
    pub price: Decimal,
    pub available: bool,
}

/// Availability of a full date
#[derive(Debug, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    /// False for past dates, which are closed for new business regardless of
    /// slot-level availability
    pub open_for_booking: bool,
    pub slots: Vec<SlotAvailability>,
}

/// Availability index over the active booking collection
#[derive(Clone)]
pub struct AvailabilityIndex {
    pool: PgPool,
}

impl AvailabilityIndex {
    /// Create a new AvailabilityIndex
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The set of slot ids held by any active booking on `date`
    ///
    /// A date with zero active bookings yields the empty set and is fully
    /// available.
    pub async fn booked_slot_ids(&self, date: NaiveDate) -> Result<HashSet<i32>, sqlx::Error> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT slot_id FROM booking_slots WHERE event_date = $1")
                .bind(date)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }

    /// Whether a specific slot is free on `date`
    pub async fn is_available(&self, date: NaiveDate, slot_id: i32) -> Result<bool, sqlx::Error> {
        let taken: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM booking_slots WHERE event_date = $1 AND slot_id = $2)",
        )
        .bind(date)
        .bind(slot_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(!taken.unwrap_or(false))
    }

    /// Whether `date` is open for NEW bookings
    ///
    /// Past dates are never offerable for new business. This rule does not
    /// apply when editing an already-existing booking for a past date.
    pub fn date_open_for_new_bookings(date: NaiveDate, today: NaiveDate) -> bool {
        date >= today
    }
}
