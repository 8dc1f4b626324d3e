use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A bookable time window at the venue
///
/// The catalog is staff-managed configuration. A definition is never deleted
/// while any booking still references it. `base_price` is the fallback
/// default only; display pricing comes from the pricing resolver once a
/// schedule exists for the slot's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SlotDefinition {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Lunch")]
    pub label: String,
    #[schema(example = "9am - 6pm")]
    pub time_range: String,
    /// Fallback price when no pricing schedule exists for this slot's name
    #[schema(example = "40000")]
    pub base_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry with its currently applicable display price
///
/// Returned by the listing endpoint so the UI never renders a stale
/// `base_price` when a pricing schedule overrides it.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotWithPrice {
    pub id: i32,
    pub label: String,
    pub time_range: String,
    /// Price resolved against the pricing schedule as of today
    #[schema(example = "45000")]
    pub price: Decimal,
}

/// Data needed to create a new slot definition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSlot {
    #[validate(length(min = 1, message = "Label must not be empty"))]
    #[schema(example = "Reception")]
    pub label: String,
    #[validate(custom = "crate::validation::validate_time_range")]
    #[schema(example = "7pm - 11pm")]
    pub time_range: String,
    #[validate(custom = "crate::validation::validate_positive_price")]
    #[schema(example = "50000")]
    pub base_price: Decimal,
}

/// Data for updating an existing slot definition
///
/// All fields are optional to support partial updates
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSlot {
    #[validate(length(min = 1, message = "Label must not be empty"))]
    #[schema(example = "Night")]
    pub label: Option<String>,
    #[schema(example = "11pm - 6am")]
    pub time_range: Option<String>,
    #[validate(custom = "crate::validation::validate_optional_positive_price")]
    #[schema(example = "35000")]
    pub base_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Slot definitions serialize with every catalog field present
    #[test]
    fn test_slot_definition_serialization() {
        let slot = SlotDefinition {
            id: 1,
            label: "Lunch".to_string(),
            time_range: "9am - 6pm".to_string(),
            base_price: dec!(40000),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&slot).expect("Failed to serialize SlotDefinition");

        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"label\":\"Lunch\""));
        assert!(json.contains("\"time_range\":\"9am - 6pm\""));
        assert!(json.contains("\"base_price\":\"40000\""));
        assert!(json.contains("\"created_at\""));
        assert!(json.contains("\"updated_at\""));
    }

    #[test]
    fn test_create_slot_deserialization() {
        let json = r#"{
            "label": "Reception",
            "time_range": "7pm - 11pm",
            "base_price": "50000"
        }"#;

        let create_slot: CreateSlot = serde_json::from_str(json)
            .expect("Failed to deserialize CreateSlot");

        assert_eq!(create_slot.label, "Reception");
        assert_eq!(create_slot.time_range, "7pm - 11pm");
        assert_eq!(create_slot.base_price, dec!(50000));
    }

    /// Partial updates leave omitted fields as None
    #[test]
    fn test_update_slot_partial_fields() {
        let json = r#"{
            "base_price": "42000"
        }"#;

        let update_slot: UpdateSlot = serde_json::from_str(json)
            .expect("Failed to deserialize UpdateSlot");

        assert_eq!(update_slot.base_price, Some(dec!(42000)));
        assert_eq!(update_slot.label, None);
        assert_eq!(update_slot.time_range, None);
    }

    #[test]
    fn test_create_slot_rejects_zero_price() {
        let create_slot = CreateSlot {
            label: "Lunch".to_string(),
            time_range: "9am - 6pm".to_string(),
            base_price: dec!(0),
        };

        assert!(create_slot.validate().is_err());
    }
}
