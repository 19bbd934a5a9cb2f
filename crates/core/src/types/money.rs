//! Money arithmetic on `Decimal`.
//!
//! Prices, costs, discounts and salaries are plain `Decimal` amounts in the
//! shop's currency. Shops run in a single currency, so no currency code is
//! carried alongside the amount.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money is rounded to.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` money column holds: `9999999999.99`.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// Round an amount to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Total for a single line: `price × quantity`, rounded. `None` if the
/// product does not fit in a `Decimal`.
#[must_use]
pub fn line_total(price: Decimal, quantity: Decimal) -> Option<Decimal> {
    price.checked_mul(quantity).map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_line_total_fractional_quantity() {
        // 1.25 kg at 3.99 per kg
        assert_eq!(line_total(dec!(3.99), dec!(1.25)), Some(dec!(4.99)));
    }

    #[test]
    fn test_line_total_whole_units() {
        assert_eq!(line_total(dec!(12.50), dec!(3)), Some(dec!(37.50)));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        assert_eq!(line_total(huge, huge), None);
    }

    #[test]
    fn test_max_money_matches_column_range() {
        assert_eq!(MAX_MONEY, dec!(9999999999.99));
    }
}
