// Booking rules
//
// Every rule a proposed booking must satisfy before it can be committed.
// Violations are collected, not fail-fast, so the caller can present all
// field-specific errors at once. Each violation carries a stable rule code
// and a human-readable message.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::bookings::{AmountCalculator, BookingIntent, PaymentMode, PaymentType};
use crate::config::BookingPolicy;

/// A single violated rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolation {
    /// Stable rule code for field-specific error display
    pub rule: &'static str,
    pub message: String,
}

impl RuleViolation {
    fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// The parsed and priced outcome of a fully valid intent
///
/// Carries everything the orchestrator needs to persist the booking without
/// re-parsing client input.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub event_date: NaiveDate,
    /// Deduplicated, ascending slot ids
    pub slot_ids: Vec<i32>,
    pub payment_type: PaymentType,
    pub payment_mode: PaymentMode,
    pub advance_amount: Option<Decimal>,
    pub total_amount: Decimal,
    pub balance_amount: Decimal,
}

/// Booking rules engine
///
/// Pure over its inputs: the conflict set and resolved prices are gathered
/// by the orchestrator and passed in, so two calls with the same inputs give
/// the same answer.
#[derive(Clone)]
pub struct BookingRules {
    policy: BookingPolicy,
    phone_re: Regex,
}

impl BookingRules {
    /// Create a new rules engine for the given policy
    pub fn new(policy: BookingPolicy) -> Self {
        let phone_re = Regex::new(&format!(r"^\d{{{}}}$", policy.phone_digits))
            .expect("phone digit pattern is valid");

        Self { policy, phone_re }
    }

    /// Validate a booking intent
    ///
    /// # Arguments
    /// * `intent` - The raw client intent
    /// * `resolved_prices` - Resolved price for each requested slot id that
    ///   exists in the catalog; ids absent from this map are unknown
    /// * `taken_slot_ids` - Slot ids held by other active bookings on the
    ///   intent's date (the booking being edited is already excluded)
    /// * `today` - Venue-local date, passed in explicitly
    /// * `is_edit` - Editing an existing booking waives the past-date rule
    ///
    /// # Returns
    /// The parsed, priced booking on success, or every violated rule.
    pub fn validate(
        &self,
        intent: &BookingIntent,
        resolved_prices: &HashMap<i32, Decimal>,
        taken_slot_ids: &HashSet<i32>,
        today: NaiveDate,
        is_edit: bool,
    ) -> Result<ValidatedBooking, Vec<RuleViolation>> {
        let mut violations = Vec::new();

        // 1. Date present and not in the past (unless editing)
        match intent.event_date {
            None => violations.push(RuleViolation::new("date_required", "Event date is required")),
            Some(date) => {
                if !is_edit && date < today {
                    violations.push(RuleViolation::new(
                        "date_in_past",
                        format!("Event date {} is in the past", date),
                    ));
                }
            }
        }

        // 2. Occasion type
        if intent.occasion_type.trim().is_empty() {
            violations.push(RuleViolation::new(
                "occasion_required",
                "Occasion type is required",
            ));
        }

        // 3. At least one slot, duplicates collapsed
        let slot_ids: Vec<i32> = intent
            .slot_ids
            .iter()
            .copied()
            .collect::<BTreeSet<i32>>()
            .into_iter()
            .collect();

        if slot_ids.is_empty() {
            violations.push(RuleViolation::new(
                "slots_required",
                "At least one slot must be selected",
            ));
        }

        // 4. Every selected slot resolves in the catalog
        let mut all_slots_known = true;
        for slot_id in &slot_ids {
            if !resolved_prices.contains_key(slot_id) {
                all_slots_known = false;
                violations.push(RuleViolation::new(
                    "slot_unknown",
                    format!("Slot {} does not exist", slot_id),
                ));
            }
        }

        // 5. No selected slot is held by a different active booking
        for slot_id in &slot_ids {
            if taken_slot_ids.contains(slot_id) {
                violations.push(RuleViolation::new(
                    "slot_taken",
                    format!("Slot {} is already booked on this date", slot_id),
                ));
            }
        }

        // 6. Required customer fields
        if intent.customer_name.trim().is_empty() {
            violations.push(RuleViolation::new(
                "customer_name_required",
                "Customer name is required",
            ));
        }
        if intent.phone1.trim().is_empty() {
            violations.push(RuleViolation::new(
                "phone1_required",
                "Primary phone number is required",
            ));
        }
        if intent.address.trim().is_empty() {
            violations.push(RuleViolation::new(
                "address_required",
                "Address is required",
            ));
        } else if intent.address.chars().count() > self.policy.max_address_len {
            violations.push(RuleViolation::new(
                "address_too_long",
                format!(
                    "Address must be at most {} characters",
                    self.policy.max_address_len
                ),
            ));
        }

        // 7. Phone digit format, applied uniformly to both numbers
        if !intent.phone1.trim().is_empty() && !self.phone_re.is_match(intent.phone1.trim()) {
            violations.push(RuleViolation::new(
                "phone1_format",
                format!(
                    "Primary phone must be exactly {} digits",
                    self.policy.phone_digits
                ),
            ));
        }
        let phone2 = intent
            .phone2
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(phone2) = phone2 {
            if !self.phone_re.is_match(phone2) {
                violations.push(RuleViolation::new(
                    "phone2_format",
                    format!(
                        "Secondary phone must be exactly {} digits",
                        self.policy.phone_digits
                    ),
                ));
            }
        }

        // Total is only meaningful once the date is known and every slot
        // resolved; amounts already charged are never derived from guesses
        let total_amount = if all_slots_known && !slot_ids.is_empty() {
            let prices: Vec<Decimal> = slot_ids
                .iter()
                .map(|id| resolved_prices[id])
                .collect();
            Some(AmountCalculator::total(&prices))
        } else {
            None
        };

        // 8. Payment type and advance amount
        let payment_type = match PaymentType::from_str(&intent.payment_type) {
            Ok(payment_type) => Some(payment_type),
            Err(_) => {
                violations.push(RuleViolation::new(
                    "payment_type_invalid",
                    "Payment type must be one of: advance, full",
                ));
                None
            }
        };

        let mut advance_amount = None;
        if payment_type == Some(PaymentType::Advance) {
            match intent.advance_amount.as_deref().map(str::trim) {
                None | Some("") => {
                    violations.push(RuleViolation::new(
                        "advance_required",
                        "Advance amount is required for advance payments",
                    ));
                }
                Some(raw) => match raw.parse::<Decimal>() {
                    Err(_) => {
                        violations.push(RuleViolation::new(
                            "advance_invalid",
                            format!("Advance amount '{}' is not a valid number", raw),
                        ));
                    }
                    Ok(amount) => {
                        if amount < self.policy.minimum_advance {
                            violations.push(RuleViolation::new(
                                "advance_below_minimum",
                                format!(
                                    "Advance must be at least {}",
                                    self.policy.minimum_advance
                                ),
                            ));
                        }
                        if let Some(total) = total_amount {
                            if intent.event_date.is_some() && amount > total {
                                violations.push(RuleViolation::new(
                                    "advance_exceeds_total",
                                    format!("Advance cannot exceed the total amount {}", total),
                                ));
                            }
                        }
                        advance_amount = Some(amount);
                    }
                },
            }
        }

        // 9. Payment mode
        let payment_mode = match PaymentMode::from_str(&intent.payment_mode) {
            Ok(payment_mode) => Some(payment_mode),
            Err(_) => {
                violations.push(RuleViolation::new(
                    "payment_mode_invalid",
                    "Payment mode must be one of: bank, cash, upi",
                ));
                None
            }
        };

        if !violations.is_empty() {
            return Err(violations);
        }

        // All rules passed: the date, slots, and payment fields are known
        let event_date = intent.event_date.expect("date checked above");
        let payment_type = payment_type.expect("payment type checked above");
        let payment_mode = payment_mode.expect("payment mode checked above");
        let total_amount = total_amount.expect("total computed above");
        let balance_amount = AmountCalculator::balance(total_amount, payment_type, advance_amount);

        Ok(ValidatedBooking {
            event_date,
            slot_ids,
            payment_type,
            payment_mode,
            advance_amount,
            total_amount,
            balance_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rules() -> BookingRules {
        BookingRules::new(BookingPolicy::default())
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn valid_intent() -> BookingIntent {
        BookingIntent {
            event_date: Some(date("2025-12-20")),
            customer_name: "Asha Verma".to_string(),
            phone1: "9876543210".to_string(),
            phone2: None,
            groom_name: Some("Rohit".to_string()),
            bride_name: Some("Asha".to_string()),
            address: "12 MG Road".to_string(),
            occasion_type: "Wedding".to_string(),
            slot_ids: vec![1, 2],
            notes: None,
            payment_type: "advance".to_string(),
            advance_amount: Some("15000".to_string()),
            payment_mode: "upi".to_string(),
        }
    }

    fn prices() -> HashMap<i32, Decimal> {
        HashMap::from([(1, dec!(40000)), (2, dec!(50000)), (3, dec!(35000))])
    }

    fn rule_codes(violations: &[RuleViolation]) -> Vec<&'static str> {
        violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn test_valid_intent_passes_with_locked_amounts() {
        let result = rules()
            .validate(
                &valid_intent(),
                &prices(),
                &HashSet::new(),
                date("2025-08-05"),
                false,
            )
            .expect("intent should be valid");

        assert_eq!(result.event_date, date("2025-12-20"));
        assert_eq!(result.slot_ids, vec![1, 2]);
        assert_eq!(result.total_amount, dec!(90000));
        assert_eq!(result.balance_amount, dec!(75000));
        assert_eq!(result.payment_type, PaymentType::Advance);
        assert_eq!(result.payment_mode, PaymentMode::Upi);
    }

    #[test]
    fn test_duplicate_slot_ids_are_collapsed() {
        let mut intent = valid_intent();
        intent.slot_ids = vec![2, 1, 2, 1];

        let result = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .expect("intent should be valid");

        assert_eq!(result.slot_ids, vec![1, 2]);
        assert_eq!(result.total_amount, dec!(90000));
    }

    /// All violated rules are reported together, not just the first
    #[test]
    fn test_violations_are_collected() {
        let intent = BookingIntent {
            event_date: None,
            customer_name: String::new(),
            phone1: String::new(),
            phone2: None,
            groom_name: None,
            bride_name: None,
            address: String::new(),
            occasion_type: String::new(),
            slot_ids: vec![],
            notes: None,
            payment_type: "credit".to_string(),
            advance_amount: None,
            payment_mode: "card".to_string(),
        };

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        let codes = rule_codes(&violations);
        assert!(codes.contains(&"date_required"));
        assert!(codes.contains(&"occasion_required"));
        assert!(codes.contains(&"slots_required"));
        assert!(codes.contains(&"customer_name_required"));
        assert!(codes.contains(&"phone1_required"));
        assert!(codes.contains(&"address_required"));
        assert!(codes.contains(&"payment_type_invalid"));
        assert!(codes.contains(&"payment_mode_invalid"));
    }

    #[test]
    fn test_past_date_rejected_for_new_bookings() {
        let mut intent = valid_intent();
        intent.event_date = Some(date("2025-08-01"));

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert!(rule_codes(&violations).contains(&"date_in_past"));
    }

    /// Editing a historical booking stays permitted
    #[test]
    fn test_past_date_allowed_when_editing() {
        let mut intent = valid_intent();
        intent.event_date = Some(date("2025-08-01"));

        let result = rules().validate(
            &intent,
            &prices(),
            &HashSet::new(),
            date("2025-08-05"),
            true,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let mut intent = valid_intent();
        intent.slot_ids = vec![1, 99];

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert!(rule_codes(&violations).contains(&"slot_unknown"));
    }

    #[test]
    fn test_taken_slot_rejected() {
        let taken = HashSet::from([2]);

        let violations = rules()
            .validate(&valid_intent(), &prices(), &taken, date("2025-08-05"), false)
            .unwrap_err();

        let codes = rule_codes(&violations);
        assert_eq!(codes, vec!["slot_taken"]);
    }

    #[test]
    fn test_phone_format_enforced_uniformly() {
        let mut intent = valid_intent();
        intent.phone1 = "12345".to_string();
        intent.phone2 = Some("98765abc10".to_string());

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        let codes = rule_codes(&violations);
        assert!(codes.contains(&"phone1_format"));
        assert!(codes.contains(&"phone2_format"));
    }

    #[test]
    fn test_eleven_digit_phone_rejected() {
        let mut intent = valid_intent();
        intent.phone1 = "98765432109".to_string();

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["phone1_format"]);
    }

    #[test]
    fn test_blank_phone2_is_treated_as_absent() {
        let mut intent = valid_intent();
        intent.phone2 = Some("  ".to_string());

        let result = rules().validate(
            &intent,
            &prices(),
            &HashSet::new(),
            date("2025-08-05"),
            false,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_address_length_bounded() {
        let mut intent = valid_intent();
        intent.address = "x".repeat(141);

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["address_too_long"]);
    }

    #[test]
    fn test_advance_below_minimum_rejected() {
        let mut intent = valid_intent();
        intent.advance_amount = Some("5000".to_string());

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["advance_below_minimum"]);
    }

    #[test]
    fn test_advance_exceeding_total_rejected() {
        let mut intent = valid_intent();
        intent.advance_amount = Some("95000".to_string());

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["advance_exceeds_total"]);
    }

    #[test]
    fn test_advance_must_be_a_number() {
        let mut intent = valid_intent();
        intent.advance_amount = Some("fifteen thousand".to_string());

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["advance_invalid"]);
    }

    #[test]
    fn test_missing_advance_rejected_for_advance_payment() {
        let mut intent = valid_intent();
        intent.advance_amount = None;

        let violations = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .unwrap_err();

        assert_eq!(rule_codes(&violations), vec!["advance_required"]);
    }

    /// Full payment needs no advance and settles the balance
    #[test]
    fn test_full_payment_ignores_advance() {
        let mut intent = valid_intent();
        intent.payment_type = "full".to_string();
        intent.advance_amount = None;

        let result = rules()
            .validate(&intent, &prices(), &HashSet::new(), date("2025-08-05"), false)
            .expect("intent should be valid");

        assert_eq!(result.payment_type, PaymentType::Full);
        assert_eq!(result.balance_amount, dec!(0));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    /// Any advance between the configured minimum and the total passes the
    /// advance rules; anything below the minimum is rejected
    #[test]
    fn prop_minimum_advance_enforcement() {
        proptest!(|(
            advance in 1u32..=200_000u32,
        )| {
            let rules = BookingRules::new(BookingPolicy::default());
            let prices = HashMap::from([(1, Decimal::from(40_000)), (2, Decimal::from(50_000))]);
            let total = Decimal::from(90_000);
            let minimum = BookingPolicy::default().minimum_advance;

            let intent = BookingIntent {
                event_date: Some("2025-12-20".parse().unwrap()),
                customer_name: "Asha Verma".to_string(),
                phone1: "9876543210".to_string(),
                phone2: None,
                groom_name: None,
                bride_name: None,
                address: "12 MG Road".to_string(),
                occasion_type: "Wedding".to_string(),
                slot_ids: vec![1, 2],
                notes: None,
                payment_type: "advance".to_string(),
                advance_amount: Some(advance.to_string()),
                payment_mode: "cash".to_string(),
            };

            let result = rules.validate(
                &intent,
                &prices,
                &HashSet::new(),
                "2025-08-05".parse().unwrap(),
                false,
            );

            let advance = Decimal::from(advance);
            if advance >= minimum && advance <= total {
                let validated = result.expect("advance within bounds should pass");
                prop_assert_eq!(validated.balance_amount, total - advance);
                prop_assert!(validated.balance_amount >= Decimal::ZERO);
            } else {
                prop_assert!(result.is_err());
            }
        });
    }
}
