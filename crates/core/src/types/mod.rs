//! Core types for Shopdesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod month;
pub mod quantity;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MAX_MONEY, MONEY_SCALE, line_total, round_money};
pub use month::{YearMonth, YearMonthError};
pub use quantity::{
    MAX_QUANTITY, QUANTITY_SCALE, QuantityUnit, UnknownUnit, decrement_clamped, increment,
};
pub use status::*;
