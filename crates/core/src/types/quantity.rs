//! Stock quantities and their units.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places a stored quantity keeps (`NUMERIC(14, 3)`).
pub const QUANTITY_SCALE: u32 = 3;

/// Largest quantity a `NUMERIC(14, 3)` column holds: `99999999999.999`.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, QUANTITY_SCALE);

/// Unit a stock quantity is tracked in.
///
/// A sale only moves stock when the sold line uses the same unit as the
/// stock item; there is no conversion between units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    /// Countable pieces.
    #[default]
    Units,
    /// Weight in kilograms.
    Kg,
}

impl QuantityUnit {
    /// The lowercase wire/database name of the unit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Kg => "kg",
        }
    }

    /// Whether a quantity in `self` may be applied to stock tracked in `other`.
    #[must_use]
    pub fn is_compatible_with(self, other: Self) -> bool {
        self == other
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown unit name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown quantity unit: {0}")]
pub struct UnknownUnit(pub String);

impl std::str::FromStr for QuantityUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "units" | "unit" | "pcs" => Ok(Self::Units),
            "kg" => Ok(Self::Kg),
            other => Err(UnknownUnit(other.to_owned())),
        }
    }
}

/// Remove `sold` from `current`, never going below zero.
///
/// Over-selling is not rejected; the stock level simply bottoms out at zero.
#[must_use]
pub fn decrement_clamped(current: Decimal, sold: Decimal) -> Decimal {
    (current - sold).max(Decimal::ZERO)
}

/// Add `returned` back onto `current`.
#[must_use]
pub fn increment(current: Decimal, returned: Decimal) -> Decimal {
    current + returned
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decrement_within_stock() {
        assert_eq!(decrement_clamped(dec!(10), dec!(3)), dec!(7));
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        assert_eq!(decrement_clamped(dec!(2), dec!(5)), Decimal::ZERO);
        assert_eq!(decrement_clamped(Decimal::ZERO, dec!(1)), Decimal::ZERO);
    }

    #[test]
    fn test_decrement_fractional_kg() {
        assert_eq!(decrement_clamped(dec!(4.5), dec!(1.25)), dec!(3.25));
    }

    #[test]
    fn test_max_quantity_matches_column_range() {
        assert_eq!(MAX_QUANTITY, dec!(99999999999.999));
    }

    #[test]
    fn test_increment() {
        assert_eq!(increment(dec!(7), dec!(3)), dec!(10));
    }

    #[test]
    fn test_unit_compatibility() {
        assert!(QuantityUnit::Kg.is_compatible_with(QuantityUnit::Kg));
        assert!(!QuantityUnit::Kg.is_compatible_with(QuantityUnit::Units));
    }

    #[test]
    fn test_unit_parse_and_display() {
        assert_eq!("KG".parse::<QuantityUnit>().unwrap(), QuantityUnit::Kg);
        assert_eq!("units".parse::<QuantityUnit>().unwrap(), QuantityUnit::Units);
        assert!("litres".parse::<QuantityUnit>().is_err());
        assert_eq!(QuantityUnit::Units.to_string(), "units");
    }

    #[test]
    fn test_unit_serde_names() {
        assert_eq!(serde_json::to_string(&QuantityUnit::Kg).unwrap(), "\"kg\"");
        let unit: QuantityUnit = serde_json::from_str("\"units\"").unwrap();
        assert_eq!(unit, QuantityUnit::Units);
    }
}
