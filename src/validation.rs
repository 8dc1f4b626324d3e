// Validation utilities module
// Provides custom validation functions for domain-specific rules

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a price is strictly positive (for required Decimal fields)
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates that an optional price is strictly positive (for Option<Decimal> fields)
pub fn validate_optional_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    validate_positive_price(price)
}

/// Validates that a slot time range is non-empty after trimming
/// e.g. "9am - 6pm"
pub fn validate_time_range(time_range: &str) -> Result<(), ValidationError> {
    if time_range.trim().is_empty() {
        Err(ValidationError::new("time_range_required"))
    } else {
        Ok(())
    }
}
