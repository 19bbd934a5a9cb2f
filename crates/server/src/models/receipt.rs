//! Receipt domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{MAX_MONEY, PaymentMethod, QuantityUnit, ReceiptId, ShopId, line_total, round_money};

use super::validation::{ValidationError, money, positive_quantity, required_text};

/// One sold line on a receipt.
///
/// Lines carry the product name rather than a stock id; the inventory
/// reconciler resolves the name against stock at save and delete time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    /// Unit selling price.
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(default)]
    pub quantity_unit: QuantityUnit,
    /// Unit cost, used for profit reporting.
    #[serde(default)]
    pub cost_price: Decimal,
}

impl ReceiptLine {
    /// `price × quantity`. Validated lines cannot overflow; anything else
    /// saturates instead of panicking.
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        line_total(self.price, self.quantity).unwrap_or(Decimal::MAX)
    }

    /// `cost_price × quantity`, saturating like [`Self::revenue`].
    #[must_use]
    pub fn cost(&self) -> Decimal {
        line_total(self.cost_price, self.quantity).unwrap_or(Decimal::MAX)
    }

    fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("items.name", &self.name)?,
            price: money("items.price", self.price)?,
            quantity: positive_quantity("items.quantity", self.quantity)?,
            quantity_unit: self.quantity_unit,
            cost_price: money("items.cost_price", self.cost_price)?,
        })
    }
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub shop_id: ShopId,
    /// Human-facing transaction reference, e.g. `TXN-20261017093012-4KQ7`.
    pub transaction_id: String,
    pub items: Vec<ReceiptLine>,
    /// `max(0, Σ line revenue − discount)`.
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub payment_method: PaymentMethod,
    /// When the sale happened.
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Receipt {
    /// Total cost of goods on this receipt.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.items.iter().map(ReceiptLine::cost).sum()
    }

    /// `total_amount − total_cost`.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.total_amount - self.total_cost()
    }
}

/// Receipt fields accepted from the API for create and edit.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptInput {
    pub items: Vec<ReceiptLine>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Sale time; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReceiptInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if there are no lines, a line has a blank
    /// name, a non-positive quantity or a negative price, an amount or
    /// quantity is out of column range, or the total does not fit.
    pub fn validated(self) -> Result<Self, ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::new("items", "a receipt needs at least one line"));
        }
        let items = self
            .items
            .into_iter()
            .map(ReceiptLine::validated)
            .collect::<Result<Vec<_>, _>>()?;
        let discount = money("discount", self.discount)?;
        compute_total(&items, discount)?;
        Ok(Self {
            items,
            discount,
            payment_method: self.payment_method,
            timestamp: self.timestamp,
        })
    }
}

/// The editable body of a receipt, with its total already computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptContent {
    pub items: Vec<ReceiptLine>,
    pub total_amount: Decimal,
    pub discount: Decimal,
    pub payment_method: PaymentMethod,
    pub timestamp: DateTime<Utc>,
}

impl ReceiptContent {
    /// Build the content from lines, computing the total.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the total does not fit a money column.
    pub fn new(
        items: Vec<ReceiptLine>,
        discount: Decimal,
        payment_method: PaymentMethod,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let total_amount = compute_total(&items, discount)?;
        Ok(Self {
            items,
            total_amount,
            discount,
            payment_method,
            timestamp,
        })
    }
}

/// A receipt ready to be written; produced by the receipt service.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub shop_id: ShopId,
    pub transaction_id: String,
    pub content: ReceiptContent,
}

/// A quantity of one product handed back by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReturnLine {
    pub name: String,
    pub quantity: Decimal,
}

/// `max(0, Σ line revenue − discount)`, rounded to cents.
///
/// # Errors
///
/// Returns `ValidationError` on `items` if the sum overflows or the total
/// exceeds [`MAX_MONEY`].
pub fn compute_total(
    items: &[ReceiptLine],
    discount: Decimal,
) -> Result<Decimal, ValidationError> {
    let too_large = || {
        ValidationError::new("items", format!("receipt total must not exceed {MAX_MONEY}"))
    };
    let subtotal = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| {
            line_total(line.price, line.quantity).and_then(|t| sum.checked_add(t))
        })
        .ok_or_else(too_large)?;
    let total = subtotal
        .checked_sub(discount)
        .map(|t| round_money(t.max(Decimal::ZERO)))
        .ok_or_else(too_large)?;
    if total > MAX_MONEY {
        return Err(too_large());
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use super::*;

    /// A line in whole units with a cost of zero.
    pub fn line(name: &str, price: Decimal, quantity: Decimal) -> ReceiptLine {
        ReceiptLine {
            name: name.to_owned(),
            price,
            quantity,
            quantity_unit: QuantityUnit::Units,
            cost_price: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::line;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_total_applies_discount() {
        let items = vec![line("Tea", dec!(2.50), dec!(2)), line("Milk", dec!(1.20), dec!(1))];
        assert_eq!(compute_total(&items, dec!(1)).unwrap(), dec!(5.20));
    }

    #[test]
    fn test_compute_total_never_negative() {
        let items = vec![line("Tea", dec!(2.50), dec!(1))];
        assert_eq!(compute_total(&items, dec!(10)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_rejects_totals_over_column_range() {
        let items = vec![
            line("Gold", dec!(9999999999.99), dec!(1)),
            line("Silver", dec!(1), dec!(1)),
        ];
        assert_eq!(compute_total(&items, Decimal::ZERO).unwrap_err().field, "items");
        assert_eq!(compute_total(&items, dec!(1)).unwrap(), dec!(9999999999.99));
    }

    #[test]
    fn test_validated_rejects_oversized_line_without_panicking() {
        let input: ReceiptInput = serde_json::from_str(
            r#"{"items":[{"name":"Tea","price":"100000000000000000000","quantity":"100000000000000000000"}]}"#,
        )
        .unwrap();
        let err = input.validated().unwrap_err();
        assert_eq!(err.field, "items.price");
    }

    #[test]
    fn test_validated_rejects_quantity_finer_than_stock_keeps() {
        let input = ReceiptInput {
            items: vec![line("Rice", dec!(60), dec!(0.0005))],
            discount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            timestamp: None,
        };
        assert_eq!(input.validated().unwrap_err().field, "items.quantity");
    }

    #[test]
    fn test_profit_uses_cost_price() {
        let now = Utc::now();
        let mut tea = line("Tea", dec!(3), dec!(4));
        tea.cost_price = dec!(2);
        let receipt = Receipt {
            id: ReceiptId::new(1),
            shop_id: ShopId::new(1),
            transaction_id: "TXN-1".to_owned(),
            items: vec![tea],
            total_amount: dec!(11),
            discount: dec!(1),
            payment_method: PaymentMethod::Cash,
            timestamp: now,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(receipt.total_cost(), dec!(8));
        assert_eq!(receipt.profit(), dec!(3));
    }

    #[test]
    fn test_validated_rejects_empty_receipt() {
        let input = ReceiptInput {
            items: vec![],
            discount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            timestamp: None,
        };
        assert_eq!(input.validated().unwrap_err().field, "items");
    }

    #[test]
    fn test_validated_rejects_zero_quantity() {
        let input = ReceiptInput {
            items: vec![line("Tea", dec!(1), Decimal::ZERO)],
            discount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            timestamp: None,
        };
        assert_eq!(input.validated().unwrap_err().field, "items.quantity");
    }

    #[test]
    fn test_line_deserialize_defaults() {
        let line: ReceiptLine =
            serde_json::from_str(r#"{"name":"Sugar","price":"1.10","quantity":"0.5"}"#).unwrap();
        assert_eq!(line.quantity_unit, QuantityUnit::Units);
        assert_eq!(line.cost_price, Decimal::ZERO);
    }
}
