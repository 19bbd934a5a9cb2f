//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{ExpenseCategory, ExpenseId, ShopId};

use super::validation::{ValidationError, positive_money};

/// Money spent running the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub shop_id: ShopId,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub spent_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expense fields accepted from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    pub spent_on: NaiveDate,
}

impl ExpenseInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is not positive or too large.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            category: self.category,
            description: self.description.trim().to_owned(),
            amount: positive_money("amount", self.amount)?,
            spent_on: self.spent_on,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_input_defaults_category() {
        let input: ExpenseInput =
            serde_json::from_str(r#"{"amount":"450","spent_on":"2026-10-02"}"#).unwrap();
        assert_eq!(input.category, ExpenseCategory::Other);
        assert!(input.validated().is_ok());
    }

    #[test]
    fn test_expense_input_rejects_negative_amount() {
        let input: ExpenseInput =
            serde_json::from_str(r#"{"amount":"-5","spent_on":"2026-10-02"}"#).unwrap();
        assert_eq!(input.validated().unwrap_err().field, "amount");
    }
}
