use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::availability::{AvailabilityIndex, DayAvailability, SlotAvailability};
use crate::bookings::{
    ArchiveRepository, Booking, BookingError, BookingIntent, BookingResponse, BookingRules,
    BookingsRepository, DeletedBooking, MonthlySummary, NewBookingRow, PaymentType,
    SlotCatalogRepository,
};
use crate::pricing::PricingResolver;

/// Service coordinating the booking flow
///
/// Receives a booking intent, gathers the conflict set and resolved prices,
/// runs the rules, and on success commits the booking and its slot
/// reservations atomically. Nothing is persisted on any error path.
#[derive(Clone)]
pub struct BookingService {
    bookings_repo: BookingsRepository,
    archive_repo: ArchiveRepository,
    catalog_repo: SlotCatalogRepository,
    availability: AvailabilityIndex,
    pricing: Arc<PricingResolver>,
    rules: BookingRules,
}

impl BookingService {
    /// Create a new BookingService
    pub fn new(
        bookings_repo: BookingsRepository,
        archive_repo: ArchiveRepository,
        catalog_repo: SlotCatalogRepository,
        availability: AvailabilityIndex,
        pricing: Arc<PricingResolver>,
        rules: BookingRules,
    ) -> Self {
        Self {
            bookings_repo,
            archive_repo,
            catalog_repo,
            availability,
            pricing,
            rules,
        }
    }

    /// Create a new booking
    ///
    /// Validates the intent, locks in resolved prices, and commits the
    /// booking with all of its slots in one transaction. A concurrent
    /// booking of any selected slot after the availability check surfaces
    /// as a Conflict, never as a partial reservation.
    pub async fn create_booking(
        &self,
        intent: BookingIntent,
        today: NaiveDate,
    ) -> Result<BookingResponse, BookingError> {
        let resolved_prices = self.resolve_prices(&intent, today).await?;
        let taken = self.taken_slot_ids(&intent, None).await?;

        let validated = self
            .rules
            .validate(&intent, &resolved_prices, &taken, today, false)
            .map_err(BookingError::Validation)?;

        let row = Self::build_row(&intent, &validated);
        let booking = self.bookings_repo.create(&row).await?;

        tracing::info!(
            "Created booking {} for {} holding slots {:?}",
            booking.id,
            booking.event_date,
            validated.slot_ids
        );

        Ok(BookingResponse::from_booking(booking, validated.slot_ids))
    }

    /// Update an existing booking
    ///
    /// Same validation path as creation, with the booking itself excluded
    /// from the conflict check and the past-date rule waived so historical
    /// bookings stay editable. The id is preserved.
    pub async fn update_booking(
        &self,
        id: Uuid,
        intent: BookingIntent,
        today: NaiveDate,
    ) -> Result<BookingResponse, BookingError> {
        let existing = self
            .bookings_repo
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let resolved_prices = self.resolve_prices(&intent, today).await?;
        let taken = self.taken_slot_ids(&intent, Some(&existing)).await?;

        let validated = self
            .rules
            .validate(&intent, &resolved_prices, &taken, today, true)
            .map_err(BookingError::Validation)?;

        let row = Self::build_row(&intent, &validated);
        let booking = self.bookings_repo.update(id, &row).await?;

        tracing::info!(
            "Updated booking {} for {} holding slots {:?}",
            booking.id,
            booking.event_date,
            validated.slot_ids
        );

        Ok(BookingResponse::from_booking(booking, validated.slot_ids))
    }

    /// Soft-delete a booking into the archive
    ///
    /// The record is moved, never erased; its slots become available again
    /// the moment the transaction commits.
    pub async fn delete_booking(&self, id: Uuid) -> Result<DeletedBooking, BookingError> {
        let archived = self.bookings_repo.soft_delete(id).await?;

        tracing::info!(
            "Archived booking {} for {} (archive id {})",
            archived.original_booking_id,
            archived.event_date,
            archived.id
        );

        Ok(archived)
    }

    /// Get a booking by id with its slot ids
    pub async fn get_booking(&self, id: Uuid) -> Result<BookingResponse, BookingError> {
        let booking = self
            .bookings_repo
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        self.with_slot_ids(booking).await
    }

    /// All bookings on a date; the calendar read path
    pub async fn get_bookings_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<BookingResponse>, BookingError> {
        let bookings = self.bookings_repo.find_by_date(date).await?;

        let mut responses = Vec::with_capacity(bookings.len());
        for booking in bookings {
            responses.push(self.with_slot_ids(booking).await?);
        }

        Ok(responses)
    }

    /// Bookings in a date range with optional filters; the reporting read path
    pub async fn list_bookings(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        occasion_type: Option<String>,
        payment_type: Option<PaymentType>,
    ) -> Result<Vec<BookingResponse>, BookingError> {
        let bookings = self
            .bookings_repo
            .find_by_date_range(from, to, occasion_type, payment_type)
            .await?;

        let mut responses = Vec::with_capacity(bookings.len());
        for booking in bookings {
            responses.push(self.with_slot_ids(booking).await?);
        }

        Ok(responses)
    }

    /// Archived bookings in a date range
    pub async fn list_archive(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeletedBooking>, BookingError> {
        self.archive_repo.find_by_date_range(from, to).await
    }

    /// Monthly booking counts and revenue sums over a date range
    ///
    /// Plain aggregates for the reporting collaborator; no formatting.
    pub async fn monthly_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlySummary>, BookingError> {
        let bookings = self
            .bookings_repo
            .find_by_date_range(from, to, None, None)
            .await?;

        let mut months: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
        for booking in &bookings {
            let month = format!(
                "{:04}-{:02}",
                booking.event_date.year(),
                booking.event_date.month()
            );
            let entry = months.entry(month).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += booking.total_amount;
        }

        Ok(months
            .into_iter()
            .map(|(month, (bookings, revenue))| MonthlySummary {
                month,
                bookings,
                revenue,
            })
            .collect())
    }

    /// Per-slot availability for one date, with applicable prices
    pub async fn day_availability(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DayAvailability, BookingError> {
        let slots = self.catalog_repo.list().await?;
        let booked = self.availability.booked_slot_ids(date).await?;

        let mut entries = Vec::with_capacity(slots.len());
        for slot in &slots {
            let price = self.pricing.price_for_slot(slot, date, today).await?;
            entries.push(SlotAvailability {
                slot_id: slot.id,
                label: slot.label.clone(),
                time_range: slot.time_range.clone(),
                price,
                available: !booked.contains(&slot.id),
            });
        }

        Ok(DayAvailability {
            date,
            open_for_booking: AvailabilityIndex::date_open_for_new_bookings(date, today),
            slots: entries,
        })
    }

    /// Resolve a price for every requested slot id that exists in the catalog
    ///
    /// Ids absent from the returned map are unknown and get flagged by the
    /// rules. When the intent has no date yet, prices are resolved against
    /// today only to establish which slots exist; the intent is rejected on
    /// the missing date before any amount derived here can be locked in.
    async fn resolve_prices(
        &self,
        intent: &BookingIntent,
        today: NaiveDate,
    ) -> Result<HashMap<i32, Decimal>, BookingError> {
        let requested: Vec<i32> = intent
            .slot_ids
            .iter()
            .copied()
            .collect::<BTreeSet<i32>>()
            .into_iter()
            .collect();

        let slots = self.catalog_repo.find_by_ids(&requested).await?;
        let pricing_date = intent.event_date.unwrap_or(today);

        let mut resolved = HashMap::with_capacity(slots.len());
        for (id, slot) in &slots {
            let price = self.pricing.price_for_slot(slot, pricing_date, today).await?;
            resolved.insert(*id, price);
        }

        Ok(resolved)
    }

    /// Slot ids held on the intent's date by other active bookings
    ///
    /// When editing, the booking's own holds are excluded so it can keep its
    /// current slots.
    async fn taken_slot_ids(
        &self,
        intent: &BookingIntent,
        editing: Option<&Booking>,
    ) -> Result<HashSet<i32>, BookingError> {
        let Some(date) = intent.event_date else {
            return Ok(HashSet::new());
        };

        let mut taken = self.availability.booked_slot_ids(date).await?;

        if let Some(existing) = editing {
            if existing.event_date == date {
                let own = self.bookings_repo.slot_ids_for(existing.id).await?;
                for slot_id in own {
                    taken.remove(&slot_id);
                }
            }
        }

        Ok(taken)
    }

    async fn with_slot_ids(&self, booking: Booking) -> Result<BookingResponse, BookingError> {
        let slot_ids = self.bookings_repo.slot_ids_for(booking.id).await?;
        Ok(BookingResponse::from_booking(booking, slot_ids))
    }

    fn build_row(
        intent: &BookingIntent,
        validated: &crate::bookings::rules::ValidatedBooking,
    ) -> NewBookingRow {
        NewBookingRow {
            event_date: validated.event_date,
            customer_name: intent.customer_name.trim().to_string(),
            phone1: intent.phone1.trim().to_string(),
            phone2: intent
                .phone2
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            groom_name: intent
                .groom_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            bride_name: intent
                .bride_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            address: intent.address.trim().to_string(),
            occasion_type: intent.occasion_type.trim().to_string(),
            notes: intent.notes.clone().filter(|n| !n.trim().is_empty()),
            payment_type: validated.payment_type,
            advance_amount: validated.advance_amount,
            payment_mode: validated.payment_mode,
            total_amount: validated.total_amount,
            balance_amount: validated.balance_amount,
            slot_ids: validated.slot_ids.clone(),
        }
    }
}
