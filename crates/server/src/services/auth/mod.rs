//! Authentication service.
//!
//! Email/password sign-up and sign-in for shop accounts, with the failed
//! attempt counter and temporary lock described in [`super::lockout`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, instrument, warn};

use shopdesk_core::{AccountStatus, Email, ShopId};

use super::clock::Clock;
use super::lockout::{LockState, LockoutPolicy};
use crate::db::{AccountStore, RepositoryError};
use crate::models::validation::required_text;
use crate::models::{NewShopAccount, ProfileUpdate, ShopAccount};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields submitted on sign-up.
#[derive(Debug, Clone, Copy)]
pub struct SignUp<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub shop_name: &'r str,
    pub owner_name: &'r str,
}

/// Authentication service.
///
/// Handles shop registration, sign-in with lockout, and profile updates.
pub struct AuthService<'a, S> {
    accounts: &'a S,
    clock: &'a dyn Clock,
    policy: LockoutPolicy,
    require_approval: bool,
}

impl<'a, S: AccountStore> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a S, clock: &'a dyn Clock, policy: LockoutPolicy) -> Self {
        Self {
            accounts,
            clock,
            policy,
            require_approval: false,
        }
    }

    /// New accounts start `pending` instead of `active`.
    #[must_use]
    pub const fn require_approval(mut self, require: bool) -> Self {
        self.require_approval = require;
        self
    }

    /// Register a new shop.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Validation` if the shop or owner name is blank.
    /// Returns `AuthError::AccountAlreadyExists` if the email is already registered.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn sign_up(&self, form: SignUp<'_>) -> Result<ShopAccount, AuthError> {
        let email = Email::parse(form.email)?;
        validate_password(form.password)?;
        let shop_name = required_text("shop_name", form.shop_name)?;
        let owner_name = required_text("owner_name", form.owner_name)?;

        let password_hash = hash_password(form.password)?;

        let account_status = if self.require_approval {
            AccountStatus::Pending
        } else {
            AccountStatus::Active
        };

        let account = self
            .accounts
            .create_account(&NewShopAccount {
                email,
                password_hash,
                shop_name,
                owner_name,
                account_status,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        info!(shop_id = %account.id, status = %account.account_status, "shop registered");
        Ok(account)
    }

    /// Sign in with email and password.
    ///
    /// Administrative blocks and live locks are refused before the password is
    /// checked and do not count as failed attempts. An expired lock is cleared
    /// first. A wrong password increments the counter and locks the account
    /// once the policy threshold is reached. A correct password clears the
    /// counter and any lock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email.
    /// Returns `AuthError::WrongPassword` with the attempts left.
    /// Returns `AuthError::AccountLocked` while locked, including on the
    /// attempt that triggers the lock.
    /// Returns `AuthError::AccountUnavailable` for pending, frozen or rejected accounts.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ShopAccount, AuthError> {
        let email = Email::parse(email)?;

        let (mut account, password_hash) = self
            .accounts
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if account.account_status.is_administrative_block() {
            info!(shop_id = %account.id, status = %account.account_status, "sign-in refused");
            return Err(AuthError::AccountUnavailable(account.account_status));
        }

        let now = self.clock.now();
        match self.policy.evaluate(&account, now) {
            LockState::Locked { until } => {
                info!(shop_id = %account.id, %until, "sign-in while locked");
                return Err(AuthError::AccountLocked { until });
            }
            LockState::Expired => {
                self.accounts.clear_lock(account.id).await?;
                reset_lock_fields(&mut account);
                info!(shop_id = %account.id, "expired lock cleared");
            }
            LockState::Open => {}
        }

        if verify_password(password, &password_hash).is_err() {
            return Err(self.record_failure(account.id).await?);
        }

        if account.failed_login_attempts > 0 || account.locked_until.is_some() {
            self.accounts.clear_lock(account.id).await?;
            reset_lock_fields(&mut account);
        }

        info!(shop_id = %account.id, "signed in");
        Ok(account)
    }

    /// Count a failed attempt and return the error to report.
    async fn record_failure(&self, id: ShopId) -> Result<AuthError, AuthError> {
        let attempts = self.accounts.record_failed_attempt(id).await?;

        if self.policy.should_lock(attempts) {
            let until = self.policy.lock_until(self.clock.now());
            self.accounts
                .lock_account(id, until, self.policy.lock_minutes())
                .await?;
            warn!(shop_id = %id, attempts, %until, "account locked after failed sign-ins");
            return Ok(AuthError::AccountLocked { until });
        }

        let remaining_attempts = self.policy.remaining_attempts(attempts);
        info!(shop_id = %id, attempts, remaining_attempts, "failed sign-in");
        Ok(AuthError::WrongPassword { remaining_attempts })
    }

    /// Load the signed-in shop's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account no longer exists.
    pub async fn profile(&self, id: ShopId) -> Result<ShopAccount, AuthError> {
        self.accounts
            .get_account(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Update shop name, owner, phone and address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account no longer exists.
    #[instrument(skip(self, update), fields(shop_id = %id))]
    pub async fn update_profile(
        &self,
        id: ShopId,
        update: &ProfileUpdate,
    ) -> Result<ShopAccount, AuthError> {
        let mut account = self.profile(id).await?;
        account.apply_profile(update);
        self.accounts.save_profile(&account).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::AccountNotFound,
            other => AuthError::Repository(other),
        })
    }
}

fn reset_lock_fields(account: &mut ShopAccount) {
    account.failed_login_attempts = 0;
    account.locked_until = None;
    account.lock_duration_minutes = None;
    if account.account_status == AccountStatus::Locked {
        account.account_status = AccountStatus::Active;
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
