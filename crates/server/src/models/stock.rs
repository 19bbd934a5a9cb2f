//! Stock item domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{QuantityUnit, ShopId, StockItemId};

use super::validation::{ValidationError, money, quantity, required_text};

/// A sellable product with a tracked quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: StockItemId,
    pub shop_id: ShopId,
    /// Product name. Receipts refer to stock by this name, case-insensitively.
    pub name: String,
    pub category: String,
    /// Selling price per unit.
    pub price: Decimal,
    /// Purchase cost per unit.
    pub cost_price: Decimal,
    /// Quantity on hand, never negative.
    pub quantity: Decimal,
    pub quantity_unit: QuantityUnit,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Whether this item matches a receipt line name.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Whether the quantity is at or below `threshold`.
    #[must_use]
    pub fn is_low(&self, threshold: Decimal) -> bool {
        self.quantity <= threshold
    }
}

/// Stock item fields accepted from the API for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct StockItemInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub quantity_unit: QuantityUnit,
}

impl StockItemInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty name, negative or out-of-range
    /// amounts, or a quantity with more than three decimal places.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", &self.name)?,
            category: self.category.trim().to_owned(),
            price: money("price", self.price)?,
            cost_price: money("cost_price", self.cost_price)?,
            quantity: quantity("quantity", self.quantity)?,
            quantity_unit: self.quantity_unit,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(name: &str, quantity: Decimal) -> StockItemInput {
        StockItemInput {
            name: name.to_owned(),
            category: " Grains ".to_owned(),
            price: dec!(2.50),
            cost_price: dec!(1.80),
            quantity,
            quantity_unit: QuantityUnit::Kg,
        }
    }

    #[test]
    fn test_validated_trims_text() {
        let input = input("  Basmati Rice ", dec!(10)).validated().unwrap();
        assert_eq!(input.name, "Basmati Rice");
        assert_eq!(input.category, "Grains");
    }

    #[test]
    fn test_validated_rejects_blank_name() {
        let err = input("   ", dec!(1)).validated().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validated_rejects_negative_quantity() {
        let err = input("Rice", dec!(-1)).validated().unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn test_validated_rejects_out_of_range_amounts() {
        let mut big = input("Gold", dec!(1));
        big.price = dec!(10000000000);
        assert_eq!(big.validated().unwrap_err().field, "price");

        let err = input("Rice", dec!(100000000000)).validated().unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn test_validated_rejects_quantity_finer_than_column() {
        let err = input("Saffron", dec!(0.0005)).validated().unwrap_err();
        assert_eq!(err.field, "quantity");
        assert!(input("Saffron", dec!(0.005)).validated().is_ok());
    }

    #[test]
    fn test_deserialize_defaults_unit_and_cost() {
        let input: StockItemInput =
            serde_json::from_str(r#"{"name":"Soap","price":"1.20","quantity":"4"}"#).unwrap();
        assert_eq!(input.quantity_unit, QuantityUnit::Units);
        assert_eq!(input.cost_price, Decimal::ZERO);
    }
}
