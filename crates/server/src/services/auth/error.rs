//! Authentication error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use shopdesk_core::AccountStatus;

use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Errors that can occur during sign-up, sign-in and profile operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shopdesk_core::EmailError),

    /// Unknown email or unusable stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Known account, wrong password, not yet locked.
    #[error("invalid credentials, {remaining_attempts} attempts remaining")]
    WrongPassword { remaining_attempts: i32 },

    /// Too many failed attempts; try again after `until`.
    #[error("account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    /// Pending, frozen or rejected by an operator.
    #[error("account is {0}")]
    AccountUnavailable(AccountStatus),

    /// Account not found.
    #[error("account not found")]
    AccountNotFound,

    /// Email already registered.
    #[error("account already exists")]
    AccountAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required sign-up or profile field is missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown to the user for a status that blocks sign-in.
    #[must_use]
    pub const fn status_message(status: AccountStatus) -> &'static str {
        match status {
            AccountStatus::Pending => "Your account is awaiting approval.",
            AccountStatus::Frozen => "Your account has been frozen. Contact support.",
            AccountStatus::Rejected => "Your account application was rejected.",
            AccountStatus::Locked => "Your account is temporarily locked.",
            AccountStatus::Active => "Your account is active.",
        }
    }
}
