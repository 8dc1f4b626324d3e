// HTTP handlers for pricing administration

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::pricing::{PricingError, PricingSchedule, SlotName};

/// Request body for setting a slot's pricing schedule
#[derive(Debug, Deserialize)]
pub struct SetScheduleRequest {
    pub current_price: Decimal,
    pub future_price: Option<Decimal>,
    pub effective_from: Option<NaiveDate>,
}

/// Handler for GET /api/pricing
/// Returns all pricing schedules as of today (rollover applied)
pub async fn get_pricing_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<PricingSchedule>>, PricingError> {
    let today = Local::now().date_naive();
    let schedules = state.pricing.schedules(today).await?;

    Ok(Json(schedules))
}

/// Handler for PUT /api/pricing/:slot_name
/// Sets or replaces the pricing schedule for a slot name (staff operation)
pub async fn set_pricing_handler(
    State(state): State<crate::AppState>,
    Path(slot_name): Path<String>,
    Json(request): Json<SetScheduleRequest>,
) -> Result<Json<PricingSchedule>, PricingError> {
    let slot_name =
        SlotName::from_str(&slot_name).map_err(|_| PricingError::UnknownSlotName(slot_name))?;

    let today = Local::now().date_naive();
    let schedule = state
        .pricing
        .set_schedule(
            slot_name,
            request.current_price,
            request.future_price,
            request.effective_from,
            today,
        )
        .await?;

    Ok(Json(schedule))
}
