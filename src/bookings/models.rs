use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment type chosen at booking time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Advance,
    Full,
}

impl PaymentType {
    /// Convert payment type to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Advance => "advance",
            PaymentType::Full => "full",
        }
    }

    /// Parse payment type from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "advance" => Ok(PaymentType::Advance),
            "full" => Ok(PaymentType::Full),
            _ => Err(format!("Invalid payment type: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment mode for the upfront amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Bank,
    Cash,
    Upi,
}

impl PaymentMode {
    /// Convert payment mode to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Bank => "bank",
            PaymentMode::Cash => "cash",
            PaymentMode::Upi => "upi",
        }
    }

    /// Parse payment mode from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "bank" => Ok(PaymentMode::Bank),
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            _ => Err(format!("Invalid payment mode: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a confirmed reservation row
///
/// The slot ids live in the `booking_slots` table and are attached when
/// building a `BookingResponse`. `total_amount` and `balance_amount` are
/// locked in at confirmation time and never recomputed from later pricing
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Archived reservation, written when a booking is soft-deleted
///
/// Same shape as `Booking` plus the archive bookkeeping fields; the slot ids
/// are denormalized into an array because the live `booking_slots` rows are
/// released so the date becomes available again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeletedBooking {
    pub id: Uuid,
    pub original_booking_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

/// Request DTO for creating or replacing a booking
///
/// The client is untrusted input only: payment fields arrive as plain
/// strings and every rule is re-checked server-side, so a bad value becomes
/// a structured per-field violation rather than a body-level rejection.
/// Missing fields default to empty and are caught by the same rules.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingIntent {
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone1: String,
    #[serde(default)]
    pub phone2: Option<String>,
    #[serde(default)]
    pub groom_name: Option<String>,
    #[serde(default)]
    pub bride_name: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub occasion_type: String,
    #[serde(default)]
    pub slot_ids: Vec<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub advance_amount: Option<String>,
    #[serde(default)]
    pub payment_mode: String,
}

/// Response DTO for a booking with its reserved slot ids
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub event_date: NaiveDate,
    pub customer_name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub groom_name: Option<String>,
    pub bride_name: Option<String>,
    pub address: String,
    pub occasion_type: String,
    pub slot_ids: Vec<i32>,
    pub notes: Option<String>,
    pub payment_type: PaymentType,
    pub advance_amount: Option<Decimal>,
    pub payment_mode: PaymentMode,
    pub total_amount: Decimal,
    pub balance_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    /// Attach the reserved slot ids to a booking row
    pub fn from_booking(booking: Booking, slot_ids: Vec<i32>) -> Self {
        Self {
            id: booking.id,
            event_date: booking.event_date,
            customer_name: booking.customer_name,
            phone1: booking.phone1,
            phone2: booking.phone2,
            groom_name: booking.groom_name,
            bride_name: booking.bride_name,
            address: booking.address,
            occasion_type: booking.occasion_type,
            slot_ids,
            notes: booking.notes,
            payment_type: booking.payment_type,
            advance_amount: booking.advance_amount,
            payment_mode: booking.payment_mode,
            total_amount: booking.total_amount,
            balance_amount: booking.balance_amount,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Monthly aggregate for the reporting collaborator
///
/// Plain counts and sums; rendering and formatting happen elsewhere.
#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    /// Calendar month in "YYYY-MM" form
    pub month: String,
    pub bookings: u64,
    pub revenue: Decimal,
}
