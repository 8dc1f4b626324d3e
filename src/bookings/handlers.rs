// HTTP handlers for booking and availability endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use crate::availability::DayAvailability;
use crate::bookings::{
    BookingError, BookingIntent, BookingResponse, DeletedBooking, MonthlySummary, PaymentType,
};

/// Query parameters for the calendar read path
#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub date: NaiveDate,
}

/// Query parameters for range-based reads (archive, report, listing)
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Optional occasion-type filter (case-insensitive)
    pub occasion_type: Option<String>,
    /// Optional payment-type filter
    pub payment_type: Option<PaymentType>,
}

/// Handler for POST /api/bookings
/// Creates a new booking from a client intent
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    Json(intent): Json<BookingIntent>,
) -> Result<(StatusCode, Json<BookingResponse>), BookingError> {
    let today = Local::now().date_naive();
    let booking = state.booking_service.create_booking(intent, today).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for PUT /api/bookings/:id
/// Replaces a booking's fields through the same validation path
pub async fn update_booking_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(intent): Json<BookingIntent>,
) -> Result<Json<BookingResponse>, BookingError> {
    let today = Local::now().date_naive();
    let booking = state
        .booking_service
        .update_booking(id, intent, today)
        .await?;

    Ok(Json(booking))
}

/// Handler for DELETE /api/bookings/:id
/// Moves the booking to the archive; never a physical erase
pub async fn delete_booking_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BookingError> {
    state.booking_service.delete_booking(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/bookings?date=YYYY-MM-DD
/// Calendar read path: all bookings on a date
pub async fn get_bookings_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, BookingError> {
    let bookings = state
        .booking_service
        .get_bookings_for_date(query.date)
        .await?;

    Ok(Json(bookings))
}

/// Handler for GET /api/bookings/:id
pub async fn get_booking_by_id_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state.booking_service.get_booking(id).await?;

    Ok(Json(booking))
}

/// Handler for GET /api/bookings/list?from=&to=
/// Enumeration read path for the reporting collaborator
pub async fn list_bookings_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<BookingResponse>>, BookingError> {
    let bookings = state
        .booking_service
        .list_bookings(query.from, query.to, query.occasion_type, query.payment_type)
        .await?;

    Ok(Json(bookings))
}

/// Handler for GET /api/bookings/archive?from=&to=
/// Soft-deleted booking history
pub async fn get_archive_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DeletedBooking>>, BookingError> {
    let archived = state
        .booking_service
        .list_archive(query.from, query.to)
        .await?;

    Ok(Json(archived))
}

/// Handler for GET /api/bookings/report?from=&to=
/// Monthly counts and revenue sums; formatting happens elsewhere
pub async fn get_report_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<MonthlySummary>>, BookingError> {
    let report = state
        .booking_service
        .monthly_report(query.from, query.to)
        .await?;

    Ok(Json(report))
}

/// Handler for GET /api/availability/:date
/// Per-slot availability and applicable prices for the calendar UI
pub async fn get_availability_handler(
    State(state): State<crate::AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayAvailability>, BookingError> {
    let today = Local::now().date_naive();
    let availability = state.booking_service.day_availability(date, today).await?;

    Ok(Json(availability))
}
