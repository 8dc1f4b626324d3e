// Pricing resolver
//
// Determines the applicable price for a slot on a given event date,
// honouring scheduled future prices. Rollover is lazy: the first read after
// a schedule's effective date promotes the future price into the current
// price, so current-vs-future is always expressed relative to "now".
// Amounts already locked into confirmed bookings are never recomputed.

pub mod error;
pub mod handlers;
pub mod store;

pub use error::{PricingError, PricingResult};
pub use handlers::{get_pricing_handler, set_pricing_handler, SetScheduleRequest};
pub use store::ScheduleStore;

use crate::models::SlotDefinition;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The pricing names a venue slot can carry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotName {
    Lunch,
    Reception,
    Night,
}

impl SlotName {
    /// Convert slot name to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Lunch => "lunch",
            SlotName::Reception => "reception",
            SlotName::Night => "night",
        }
    }

    /// Parse slot name from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "lunch" => Ok(SlotName::Lunch),
            "reception" => Ok(SlotName::Reception),
            "night" => Ok(SlotName::Night),
            _ => Err(format!("Invalid slot name: {}", s)),
        }
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-slot-name pricing with an optional scheduled future price
///
/// `future_price` and `effective_from` are set and cleared together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PricingSchedule {
    pub slot_name: SlotName,
    pub current_price: Decimal,
    pub future_price: Option<Decimal>,
    pub effective_from: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl PricingSchedule {
    /// The price that applies to an event on `event_date`, given this
    /// schedule's state
    ///
    /// The future price applies once the event date reaches the effective
    /// date; otherwise the current price stands.
    pub fn applicable_price(&self, event_date: NaiveDate) -> Decimal {
        match (self.future_price, self.effective_from) {
            (Some(future_price), Some(effective_from)) if event_date >= effective_from => {
                future_price
            }
            _ => self.current_price,
        }
    }

    /// Whether the wall-clock date has reached this schedule's effective date
    pub fn rollover_due(&self, today: NaiveDate) -> bool {
        match (self.future_price, self.effective_from) {
            (Some(_), Some(effective_from)) => effective_from <= today,
            _ => false,
        }
    }
}

/// Pricing resolver
///
/// Answers "what does this slot cost for an event on date X" against the
/// schedule store, falling back to the catalog base price for slots whose
/// label has no schedule.
#[derive(Clone)]
pub struct PricingResolver {
    store: ScheduleStore,
}

impl PricingResolver {
    /// Create a new PricingResolver
    pub fn new(store: ScheduleStore) -> Self {
        Self { store }
    }

    /// Resolve the price for a slot name and event date
    ///
    /// Fails with `ScheduleNotFound` when the name has no schedule row; use
    /// `price_for_slot` for catalog-backed resolution with fallback.
    pub async fn resolve_price(
        &self,
        slot_name: SlotName,
        event_date: NaiveDate,
        today: NaiveDate,
    ) -> PricingResult<Decimal> {
        let schedule = self
            .store
            .get(slot_name, today)
            .await?
            .ok_or_else(|| PricingError::ScheduleNotFound(slot_name.to_string()))?;

        Ok(schedule.applicable_price(event_date))
    }

    /// Resolve the price for a catalog slot definition
    ///
    /// A slot whose label maps to a scheduled name takes the schedule's
    /// price; any other slot falls back to its catalog base price.
    pub async fn price_for_slot(
        &self,
        slot: &SlotDefinition,
        event_date: NaiveDate,
        today: NaiveDate,
    ) -> PricingResult<Decimal> {
        let slot_name = match SlotName::from_str(&slot.label) {
            Ok(name) => name,
            Err(_) => return Ok(slot.base_price),
        };

        match self.store.get(slot_name, today).await? {
            Some(schedule) => Ok(schedule.applicable_price(event_date)),
            None => Ok(slot.base_price),
        }
    }

    /// All schedules as of today (rollover applied), for the admin view
    pub async fn schedules(&self, today: NaiveDate) -> PricingResult<Vec<PricingSchedule>> {
        self.store.all(today).await
    }

    /// Staff operation: set or replace the schedule for a slot name
    ///
    /// `current_price` must be positive; when a future price is given its
    /// effective date must accompany it and lie strictly after today.
    pub async fn set_schedule(
        &self,
        slot_name: SlotName,
        current_price: Decimal,
        future_price: Option<Decimal>,
        effective_from: Option<NaiveDate>,
        today: NaiveDate,
    ) -> PricingResult<PricingSchedule> {
        if current_price <= Decimal::ZERO {
            return Err(PricingError::InvalidSchedule(
                "current price must be positive".to_string(),
            ));
        }

        match (future_price, effective_from) {
            (None, None) => {}
            (Some(price), Some(effective)) => {
                if price <= Decimal::ZERO {
                    return Err(PricingError::InvalidSchedule(
                        "future price must be positive".to_string(),
                    ));
                }
                if effective <= today {
                    return Err(PricingError::InvalidSchedule(format!(
                        "effective date {} must be after today",
                        effective
                    )));
                }
            }
            _ => {
                return Err(PricingError::InvalidSchedule(
                    "future price and effective date must be set together".to_string(),
                ));
            }
        }

        let schedule = PricingSchedule {
            slot_name,
            current_price,
            future_price,
            effective_from,
            updated_at: Utc::now(),
        };

        self.store.upsert(&schedule).await
    }
}
