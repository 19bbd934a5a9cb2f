//! Shop account administration.
//!
//! # Usage
//!
//! ```bash
//! shopdesk shop create -e owner@corner.shop -s "Corner Shop" -o "Asha Rao" -p 'long-password'
//! shopdesk shop list
//! shopdesk shop approve owner@corner.shop
//! shopdesk shop freeze owner@corner.shop
//! shopdesk shop reject owner@corner.shop
//! shopdesk shop unlock owner@corner.shop
//! ```

use thiserror::Error;

use shopdesk_core::{AccountStatus, Email, EmailError};
use shopdesk_server::db::{AccountRepository, AccountStore, RepositoryError};
use shopdesk_server::models::ShopAccount;
use shopdesk_server::services::lockout::LockoutPolicy;
use shopdesk_server::services::{AuthError, AuthService, SignUp, SystemClock};

use super::{ConnectError, connect};

/// Errors from shop administration.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No shop account with email: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create an active shop account.
///
/// # Errors
///
/// Returns `ShopError::Auth` if the details are rejected or the email is taken.
pub async fn create(
    email: &str,
    shop_name: &str,
    owner_name: &str,
    password: &str,
) -> Result<ShopAccount, ShopError> {
    let pool = connect().await?;
    let accounts = AccountRepository::new(&pool);
    let account = AuthService::new(&accounts, &SystemClock, LockoutPolicy::default())
        .sign_up(SignUp {
            email,
            password,
            shop_name,
            owner_name,
        })
        .await?;

    tracing::info!(
        "Shop created! ID: {}, Email: {}, Status: {}",
        account.id,
        account.email,
        account.account_status
    );
    Ok(account)
}

/// Print every shop account.
///
/// # Errors
///
/// Returns `ShopError::Repository` if the query fails.
pub async fn list() -> Result<(), ShopError> {
    let pool = connect().await?;
    let accounts = AccountRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:>5}  {:<32}  {:<24}  {:<9}  {:>8}  LOCKED UNTIL",
            "ID", "EMAIL", "SHOP", "STATUS", "FAILURES"
        );
        for account in &accounts {
            println!(
                "{:>5}  {:<32}  {:<24}  {:<9}  {:>8}  {}",
                account.id,
                account.email,
                account.shop_name,
                account.account_status,
                account.failed_login_attempts,
                account
                    .locked_until
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}

async fn find(accounts: &AccountRepository<'_>, email: &str) -> Result<ShopAccount, ShopError> {
    let email = Email::parse(email)?;
    accounts
        .find_account_by_email(&email)
        .await?
        .ok_or_else(|| ShopError::NotFound(email.into_inner()))
}

/// Change an account's status (approve, freeze, reject).
///
/// # Errors
///
/// Returns `ShopError::NotFound` if no account has this email.
pub async fn set_status(email: &str, status: AccountStatus) -> Result<ShopAccount, ShopError> {
    let pool = connect().await?;
    let accounts = AccountRepository::new(&pool);
    let account = find(&accounts, email).await?;

    let updated = accounts.set_account_status(account.id, status).await?;
    tracing::info!(
        "Shop {} status: {} -> {}",
        updated.email,
        account.account_status,
        updated.account_status
    );
    Ok(updated)
}

/// Clear failed sign-in attempts and any temporary lock.
///
/// # Errors
///
/// Returns `ShopError::NotFound` if no account has this email.
pub async fn unlock(email: &str) -> Result<(), ShopError> {
    let pool = connect().await?;
    let accounts = AccountRepository::new(&pool);
    let account = find(&accounts, email).await?;

    accounts.clear_lock(account.id).await?;
    tracing::info!(
        "Shop {} unlocked ({} failed attempts cleared)",
        account.email,
        account.failed_login_attempts
    );
    Ok(())
}
