//! Database operations for the shop `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `shop_account` - Tenants, credentials and sign-in lockout state
//! - `stock_item` - Inventory, unique per shop by lowercased name
//! - `receipt` - Sales; lines are a JSONB document on the row
//! - `employee`, `attendance`, `salary_payment` - Staff records
//! - `expense` - Running costs
//! - `session` - Session storage (created by `shopdesk migrate`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shopdesk-cli -- migrate
//! ```
//!
//! Service code is written against the traits in [`store`]; the repositories in
//! this module implement them over `PgPool`, and [`memory::MemoryStore`]
//! implements them in memory for tests.

pub mod accounts;
pub mod attendance;
pub mod employees;
pub mod expenses;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod receipts;
pub mod salary;
pub mod stock;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use attendance::AttendanceRepository;
pub use employees::EmployeeRepository;
pub use expenses::ExpenseRepository;
pub use receipts::ReceiptRepository;
pub use salary::SalaryPaymentRepository;
pub use stock::StockRepository;
pub use store::{AccountStore, ReceiptStore, StockStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-violation into `Conflict` with the given message.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Parse a text column into one of the core enums.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_reports_corruption() {
        let err = parse_column::<shopdesk_core::QuantityUnit>("quantity_unit", "litres")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
        assert!(err.to_string().contains("quantity_unit"));
    }

    #[test]
    fn test_parse_column_ok() {
        let status = parse_column::<shopdesk_core::AccountStatus>("account_status", "frozen");
        assert!(matches!(status, Ok(shopdesk_core::AccountStatus::Frozen)));
    }
}
