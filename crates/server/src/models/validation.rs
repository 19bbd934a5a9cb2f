//! Input validation errors shared by the `*Input` types.

use rust_decimal::Decimal;
use thiserror::Error;

use shopdesk_core::{MAX_MONEY, MAX_QUANTITY, QUANTITY_SCALE};

/// A rejected field in a submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trimmed, non-empty text.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(value)
}

pub(crate) fn positive(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(value)
}

/// Non-negative amount that fits a money column.
pub(crate) fn money(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    let value = non_negative(field, value)?;
    if value > MAX_MONEY {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_MONEY}")));
    }
    Ok(value)
}

/// Positive amount that fits a money column.
pub(crate) fn positive_money(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    money(field, positive(field, value)?)
}

/// Non-negative quantity that a stock column stores without rounding.
pub(crate) fn quantity(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    let value = non_negative(field, value)?;
    if value > MAX_QUANTITY {
        return Err(ValidationError::new(field, format!("must not exceed {MAX_QUANTITY}")));
    }
    if value.normalize().scale() > QUANTITY_SCALE {
        return Err(ValidationError::new(
            field,
            format!("must have at most {QUANTITY_SCALE} decimal places"),
        ));
    }
    Ok(value)
}

/// Positive quantity that a stock column stores without rounding.
pub(crate) fn positive_quantity(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, ValidationError> {
    quantity(field, positive(field, value)?)
}
