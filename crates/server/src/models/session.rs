//! Session-related types for shop authentication.

use serde::{Deserialize, Serialize};

use shopdesk_core::{Email, ShopId};

use super::account::ShopAccount;

/// Session-stored shop identity.
///
/// Minimal data stored in the session to identify the signed-in shop. Every
/// data route scopes its queries by `shop_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentShop {
    /// Shop account database ID.
    pub shop_id: ShopId,
    /// Owner's login email.
    pub email: Email,
    /// Display name of the shop.
    pub shop_name: String,
}

impl From<&ShopAccount> for CurrentShop {
    fn from(account: &ShopAccount) -> Self {
        Self {
            shop_id: account.id,
            email: account.email.clone(),
            shop_name: account.shop_name.clone(),
        }
    }
}

/// Session keys for shop authentication data.
pub mod keys {
    /// Key for storing the current signed-in shop.
    pub const CURRENT_SHOP: &str = "current_shop";
}
