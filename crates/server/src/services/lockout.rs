//! Sign-in lockout policy.
//!
//! An account moves `active → locked` after `max_failed_attempts` consecutive
//! failed sign-ins and back to `active` once the lock has expired or on the
//! next successful sign-in after expiry. This module only evaluates state; the
//! sign-in flow in [`super::auth`] applies the transitions through the store.

use chrono::{DateTime, Duration, Utc};

use crate::models::ShopAccount;

/// Default number of consecutive failures before an account is locked.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: i32 = 5;

/// Default lock length in minutes.
pub const DEFAULT_LOCK_MINUTES: i32 = 15;

/// Where an account stands with respect to the lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No lock in place.
    Open,
    /// Locked; sign-in attempts are rejected without being counted.
    Locked { until: DateTime<Utc> },
    /// A lock was in place but has run out and should be cleared.
    Expired,
}

/// Thresholds for locking accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_failed_attempts: i32,
    lock_minutes: i32,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lock_minutes: DEFAULT_LOCK_MINUTES,
        }
    }
}

impl LockoutPolicy {
    /// Create a policy. Both values are raised to at least 1.
    #[must_use]
    pub fn new(max_failed_attempts: i32, lock_minutes: i32) -> Self {
        Self {
            max_failed_attempts: max_failed_attempts.max(1),
            lock_minutes: lock_minutes.max(1),
        }
    }

    #[must_use]
    pub const fn max_failed_attempts(&self) -> i32 {
        self.max_failed_attempts
    }

    #[must_use]
    pub const fn lock_minutes(&self) -> i32 {
        self.lock_minutes
    }

    /// Evaluate an account's lock at `now`.
    ///
    /// An account whose status says `locked` but which carries no expiry is
    /// treated as expired so it cannot stay locked forever.
    #[must_use]
    pub fn evaluate(&self, account: &ShopAccount, now: DateTime<Utc>) -> LockState {
        match account.locked_until {
            Some(until) if now < until => LockState::Locked { until },
            Some(_) => LockState::Expired,
            None if account.account_status == shopdesk_core::AccountStatus::Locked => {
                LockState::Expired
            }
            None => LockState::Open,
        }
    }

    /// Whether `attempts` consecutive failures should lock the account.
    #[must_use]
    pub const fn should_lock(&self, attempts: i32) -> bool {
        attempts >= self.max_failed_attempts
    }

    /// Failures left before the account is locked.
    #[must_use]
    pub fn remaining_attempts(&self, attempts: i32) -> i32 {
        (self.max_failed_attempts - attempts).max(0)
    }

    /// Expiry of a lock placed at `now`.
    #[must_use]
    pub fn lock_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(i64::from(self.lock_minutes))
    }
}
