use rust_decimal::Decimal;

use crate::bookings::PaymentType;

/// Service for computing booking amounts
///
/// Amounts are resolved once, at confirmation time, and stored on the
/// booking; they are never recomputed against later pricing changes.
pub struct AmountCalculator;

impl AmountCalculator {
    /// Total amount for a booking
    ///
    /// # Arguments
    /// * `resolved_prices` - Resolved price of every selected slot
    ///
    /// # Returns
    /// Total as Decimal (sum of all resolved slot prices)
    pub fn total(resolved_prices: &[Decimal]) -> Decimal {
        resolved_prices.iter().sum()
    }

    /// Outstanding balance after the upfront payment
    ///
    /// Full payment settles the booking; an advance leaves the remainder.
    pub fn balance(total: Decimal, payment_type: PaymentType, advance: Option<Decimal>) -> Decimal {
        match payment_type {
            PaymentType::Full => Decimal::ZERO,
            PaymentType::Advance => total - advance.unwrap_or(Decimal::ZERO),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    /// Balance arithmetic: balance == total - paid, where paid is the full
    /// total for full payments and the advance otherwise
    #[test]
    fn prop_balance_arithmetic() {
        proptest!(|(
            prices_cents in prop::collection::vec(1u32..=10_000_000u32, 1..=3),
            advance_cents in 0u32..=10_000_000u32,
        )| {
            let prices: Vec<Decimal> = prices_cents.iter().map(|&c| Decimal::from(c)).collect();
            let total = AmountCalculator::total(&prices);
            let advance = Decimal::from(advance_cents).min(total);

            let advance_balance =
                AmountCalculator::balance(total, PaymentType::Advance, Some(advance));
            prop_assert_eq!(advance_balance, total - advance);

            let full_balance = AmountCalculator::balance(total, PaymentType::Full, None);
            prop_assert_eq!(full_balance, Decimal::ZERO);
        });
    }

    /// Balance is never negative when the advance does not exceed the total
    /// (the rules reject larger advances before amounts are computed)
    #[test]
    fn prop_balance_is_non_negative() {
        proptest!(|(
            prices_cents in prop::collection::vec(1u32..=10_000_000u32, 1..=3),
            advance_cents in 0u32..=10_000_000u32,
        )| {
            let prices: Vec<Decimal> = prices_cents.iter().map(|&c| Decimal::from(c)).collect();
            let total = AmountCalculator::total(&prices);
            let advance = Decimal::from(advance_cents).min(total);

            let balance = AmountCalculator::balance(total, PaymentType::Advance, Some(advance));
            prop_assert!(balance >= Decimal::ZERO, "Balance must be non-negative, got: {}", balance);
        });
    }

    /// Total does not depend on the order of the resolved prices
    #[test]
    fn prop_total_is_commutative() {
        proptest!(|(
            prices_cents in prop::collection::vec(1u32..=10_000_000u32, 2..=5),
        )| {
            let prices: Vec<Decimal> = prices_cents.iter().map(|&c| Decimal::from(c)).collect();
            let total1 = AmountCalculator::total(&prices);

            let mut reversed = prices.clone();
            reversed.reverse();
            let total2 = AmountCalculator::total(&reversed);

            prop_assert_eq!(total1, total2);
        });
    }
}
