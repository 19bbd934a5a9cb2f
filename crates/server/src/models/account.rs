//! Shop account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopdesk_core::{AccountStatus, Email, ShopId};

/// A shop account: the tenant that owns every other document.
///
/// The password hash is deliberately not part of this type; it is only read
/// through `AccountStore::get_credentials`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopAccount {
    /// Database ID.
    pub id: ShopId,
    /// Stable identity handed out at sign-up.
    pub uid: Uuid,
    /// Login email (normalized).
    pub email: Email,
    /// Display name of the shop.
    pub shop_name: String,
    /// Name of the owner.
    pub owner_name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address printed on receipts.
    pub address: Option<String>,
    /// Consecutive failed sign-ins since the last success.
    pub failed_login_attempts: i32,
    /// When the current lock expires.
    pub locked_until: Option<DateTime<Utc>>,
    /// Length of the current lock in minutes.
    pub lock_duration_minutes: Option<i32>,
    /// Lifecycle status.
    pub account_status: AccountStatus,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a new shop account.
#[derive(Debug, Clone)]
pub struct NewShopAccount {
    pub email: Email,
    pub password_hash: String,
    pub shop_name: String,
    pub owner_name: String,
    pub account_status: AccountStatus,
}

/// Partial update of the shop profile.
///
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub shop_name: Option<String>,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ShopAccount {
    /// Apply a profile update in place, trimming text and ignoring blank names.
    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        if let Some(name) = non_blank(update.shop_name.as_deref()) {
            self.shop_name = name;
        }
        if let Some(name) = non_blank(update.owner_name.as_deref()) {
            self.owner_name = name;
        }
        if let Some(phone) = update.phone.as_deref() {
            self.phone = non_blank(Some(phone));
        }
        if let Some(address) = update.address.as_deref() {
            self.address = non_blank(Some(address));
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_profile_trims_and_skips_blank_names() {
        let mut account = fixtures::account(1, "owner@shop.com");
        account.apply_profile(&ProfileUpdate {
            shop_name: Some("  ".to_owned()),
            owner_name: Some(" Alex ".to_owned()),
            phone: Some("555-0101".to_owned()),
            address: None,
        });
        assert_eq!(account.shop_name, "Corner Shop");
        assert_eq!(account.owner_name, "Alex");
        assert_eq!(account.phone.as_deref(), Some("555-0101"));
        assert_eq!(account.address, None);
    }

    #[test]
    fn test_apply_profile_blank_phone_clears_it() {
        let mut account = fixtures::account(1, "owner@shop.com");
        account.phone = Some("555".to_owned());
        account.apply_profile(&ProfileUpdate {
            phone: Some(String::new()),
            ..ProfileUpdate::default()
        });
        assert_eq!(account.phone, None);
    }
}
