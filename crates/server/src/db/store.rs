//! Storage seams used by the services.
//!
//! Reconciliation, receipt bookkeeping and the sign-in flow are written against
//! these traits so they can run over Postgres in production and over
//! [`super::memory::MemoryStore`] in tests. Method names are distinct across the
//! traits because one type may implement all three.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use shopdesk_core::{AccountStatus, Email, ReceiptId, ShopId, StockItemId};

use super::RepositoryError;
use crate::models::{
    NewReceipt, NewShopAccount, Receipt, ReceiptContent, ShopAccount, StockItem, StockItemInput,
};

/// Stock item persistence.
pub trait StockStore: Send + Sync {
    /// All items of a shop sorted by name, optionally restricted to a category.
    fn list_stock(
        &self,
        shop_id: ShopId,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<StockItem>, RepositoryError>> + Send;

    fn get_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
    ) -> impl Future<Output = Result<Option<StockItem>, RepositoryError>> + Send;

    /// Case-insensitive lookup by product name.
    fn find_stock_by_name(
        &self,
        shop_id: ShopId,
        name: &str,
    ) -> impl Future<Output = Result<Option<StockItem>, RepositoryError>> + Send;

    /// Insert a new item.
    ///
    /// Fails with `RepositoryError::Conflict` when the shop already has an item
    /// with the same name in any casing.
    fn create_stock(
        &self,
        shop_id: ShopId,
        input: &StockItemInput,
    ) -> impl Future<Output = Result<StockItem, RepositoryError>> + Send;

    /// Overwrite an item's fields. Fails with `NotFound` or `Conflict`.
    fn update_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        input: &StockItemInput,
    ) -> impl Future<Output = Result<StockItem, RepositoryError>> + Send;

    /// Add `delta` (possibly negative) to the quantity in one step, clamping
    /// the result at zero. Returns the new quantity.
    fn adjust_stock_quantity(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        delta: Decimal,
    ) -> impl Future<Output = Result<Decimal, RepositoryError>> + Send;

    /// Returns `false` when there was nothing to delete.
    fn delete_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Receipt persistence.
pub trait ReceiptStore: Send + Sync {
    fn create_receipt(
        &self,
        receipt: &NewReceipt,
    ) -> impl Future<Output = Result<Receipt, RepositoryError>> + Send;

    fn get_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> impl Future<Output = Result<Option<Receipt>, RepositoryError>> + Send;

    /// Receipts with `from <= timestamp < to`, newest first. Open bounds are
    /// unrestricted.
    fn list_receipts(
        &self,
        shop_id: ShopId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Receipt>, RepositoryError>> + Send;

    /// Replace lines, totals, payment method and timestamp. Fails with `NotFound`.
    fn update_receipt_content(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        content: &ReceiptContent,
    ) -> impl Future<Output = Result<Receipt, RepositoryError>> + Send;

    /// Delete a receipt and hand back what was deleted.
    fn delete_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> impl Future<Output = Result<Option<Receipt>, RepositoryError>> + Send;
}

/// Shop account persistence, including the sign-in lockout fields.
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    fn create_account(
        &self,
        account: &NewShopAccount,
    ) -> impl Future<Output = Result<ShopAccount, RepositoryError>> + Send;

    fn get_account(
        &self,
        id: ShopId,
    ) -> impl Future<Output = Result<Option<ShopAccount>, RepositoryError>> + Send;

    fn find_account_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<ShopAccount>, RepositoryError>> + Send;

    /// The account together with its password hash.
    fn get_credentials(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(ShopAccount, String)>, RepositoryError>> + Send;

    /// Increment the failed sign-in counter in one step and return the new count.
    fn record_failed_attempt(
        &self,
        id: ShopId,
    ) -> impl Future<Output = Result<i32, RepositoryError>> + Send;

    /// Put the account in `locked` status until `until`.
    fn lock_account(
        &self,
        id: ShopId,
        until: DateTime<Utc>,
        duration_minutes: i32,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Reset the counter and lock fields. A `locked` status returns to
    /// `active`; any other status is left alone.
    fn clear_lock(&self, id: ShopId) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Fails with `NotFound`.
    fn set_account_status(
        &self,
        id: ShopId,
        status: AccountStatus,
    ) -> impl Future<Output = Result<ShopAccount, RepositoryError>> + Send;

    /// Persist the profile fields (`shop_name`, `owner_name`, `phone`, `address`).
    fn save_profile(
        &self,
        account: &ShopAccount,
    ) -> impl Future<Output = Result<ShopAccount, RepositoryError>> + Send;
}
