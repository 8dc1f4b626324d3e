use rust_decimal::Decimal;
use std::env;

/// Default minimum advance payment when MINIMUM_ADVANCE is not set
const DEFAULT_MINIMUM_ADVANCE: i64 = 10000;

/// Phone numbers must be exactly this many digits
const PHONE_DIGITS: usize = 10;

/// Maximum accepted length for the customer address field
const MAX_ADDRESS_LEN: usize = 140;

/// Business policy for booking validation
///
/// Carried explicitly in application state and passed into the booking rules;
/// the core never reads configuration ambiently.
#[derive(Clone, Debug)]
pub struct BookingPolicy {
    /// Smallest accepted advance payment amount
    pub minimum_advance: Decimal,
    /// Required digit count for phone1 and phone2
    pub phone_digits: usize,
    /// Maximum character length for the address field
    pub max_address_len: usize,
}

impl BookingPolicy {
    /// Build the policy from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let minimum_advance = env::var("MINIMUM_ADVANCE")
            .ok()
            .and_then(|v| v.parse::<Decimal>().ok())
            .unwrap_or_else(|| Decimal::from(DEFAULT_MINIMUM_ADVANCE));

        Self {
            minimum_advance,
            phone_digits: PHONE_DIGITS,
            max_address_len: MAX_ADDRESS_LEN,
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            minimum_advance: Decimal::from(DEFAULT_MINIMUM_ADVANCE),
            phone_digits: PHONE_DIGITS,
            max_address_len: MAX_ADDRESS_LEN,
        }
    }
}
