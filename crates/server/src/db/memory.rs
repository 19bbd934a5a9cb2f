//! In-memory implementation of the store traits.
//!
//! Used by unit tests and, behind the `testing` feature, by the integration
//! tests. Mirrors the Postgres repositories closely enough for service logic:
//! case-insensitive unique stock names, clamped quantity adjustment, unique
//! account emails, newest-first receipt listing.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use shopdesk_core::{
    AccountStatus, Email, ReceiptId, ShopId, StockItemId, decrement_clamped, increment,
};

use super::RepositoryError;
use super::store::{AccountStore, ReceiptStore, StockStore};
use crate::models::{
    NewReceipt, NewShopAccount, Receipt, ReceiptContent, ShopAccount, StockItem, StockItemInput,
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    stock: BTreeMap<i32, StockItem>,
    receipts: BTreeMap<i32, Receipt>,
    accounts: BTreeMap<i32, (ShopAccount, String)>,
    failing_stock: HashSet<StockItemId>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn name_taken(&self, shop_id: ShopId, name: &str, except: Option<StockItemId>) -> bool {
        self.stock
            .values()
            .any(|s| s.shop_id == shop_id && Some(s.id) != except && s.matches_name(name))
    }

    fn account_mut(&mut self, id: ShopId) -> Result<&mut ShopAccount, RepositoryError> {
        self.accounts
            .get_mut(&id.as_i32())
            .map(|(account, _)| account)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Shared in-memory tables. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("memory store poisoned".to_owned()))
    }

    /// Make every quantity adjustment of this item fail with a database error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the store mutex is poisoned.
    pub fn fail_adjustments(&self, id: StockItemId) -> Result<(), RepositoryError> {
        self.lock()?.failing_stock.insert(id);
        Ok(())
    }
}

impl StockStore for MemoryStore {
    async fn list_stock(
        &self,
        shop_id: ShopId,
        category: Option<&str>,
    ) -> Result<Vec<StockItem>, RepositoryError> {
        let tables = self.lock()?;
        let mut items: Vec<StockItem> = tables
            .stock
            .values()
            .filter(|s| s.shop_id == shop_id)
            .filter(|s| category.is_none_or(|c| s.category == c))
            .cloned()
            .collect();
        items.sort_by_key(|s| s.name.to_lowercase());
        Ok(items)
    }

    async fn get_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
    ) -> Result<Option<StockItem>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .stock
            .get(&id.as_i32())
            .filter(|s| s.shop_id == shop_id)
            .cloned())
    }

    async fn find_stock_by_name(
        &self,
        shop_id: ShopId,
        name: &str,
    ) -> Result<Option<StockItem>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .stock
            .values()
            .find(|s| s.shop_id == shop_id && s.matches_name(name))
            .cloned())
    }

    async fn create_stock(
        &self,
        shop_id: ShopId,
        input: &StockItemInput,
    ) -> Result<StockItem, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.name_taken(shop_id, &input.name, None) {
            return Err(RepositoryError::Conflict(
                "a stock item with this name already exists".to_owned(),
            ));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let item = StockItem {
            id: StockItemId::new(id),
            shop_id,
            name: input.name.clone(),
            category: input.category.clone(),
            price: input.price,
            cost_price: input.cost_price,
            quantity: input.quantity,
            quantity_unit: input.quantity_unit,
            created_at: now,
            updated_at: now,
        };
        tables.stock.insert(id, item.clone());
        Ok(item)
    }

    async fn update_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        input: &StockItemInput,
    ) -> Result<StockItem, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.name_taken(shop_id, &input.name, Some(id)) {
            return Err(RepositoryError::Conflict(
                "a stock item with this name already exists".to_owned(),
            ));
        }
        let item = tables
            .stock
            .get_mut(&id.as_i32())
            .filter(|s| s.shop_id == shop_id)
            .ok_or(RepositoryError::NotFound)?;
        item.name.clone_from(&input.name);
        item.category.clone_from(&input.category);
        item.price = input.price;
        item.cost_price = input.cost_price;
        item.quantity = input.quantity;
        item.quantity_unit = input.quantity_unit;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn adjust_stock_quantity(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        delta: Decimal,
    ) -> Result<Decimal, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.failing_stock.contains(&id) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let item = tables
            .stock
            .get_mut(&id.as_i32())
            .filter(|s| s.shop_id == shop_id)
            .ok_or(RepositoryError::NotFound)?;
        item.quantity = if delta.is_sign_negative() {
            decrement_clamped(item.quantity, -delta)
        } else {
            increment(item.quantity, delta)
        };
        item.updated_at = Utc::now();
        Ok(item.quantity)
    }

    async fn delete_stock(&self, shop_id: ShopId, id: StockItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let owned = tables
            .stock
            .get(&id.as_i32())
            .is_some_and(|s| s.shop_id == shop_id);
        if owned {
            tables.stock.remove(&id.as_i32());
        }
        Ok(owned)
    }
}

impl ReceiptStore for MemoryStore {
    async fn create_receipt(&self, receipt: &NewReceipt) -> Result<Receipt, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .receipts
            .values()
            .any(|r| r.transaction_id == receipt.transaction_id)
        {
            return Err(RepositoryError::Conflict(
                "transaction id already exists".to_owned(),
            ));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let content = receipt.content.clone();
        let stored = Receipt {
            id: ReceiptId::new(id),
            shop_id: receipt.shop_id,
            transaction_id: receipt.transaction_id.clone(),
            items: content.items,
            total_amount: content.total_amount,
            discount: content.discount,
            payment_method: content.payment_method,
            timestamp: content.timestamp,
            created_at: now,
            updated_at: now,
        };
        tables.receipts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .receipts
            .get(&id.as_i32())
            .filter(|r| r.shop_id == shop_id)
            .cloned())
    }

    async fn list_receipts(
        &self,
        shop_id: ShopId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let tables = self.lock()?;
        let mut receipts: Vec<Receipt> = tables
            .receipts
            .values()
            .filter(|r| r.shop_id == shop_id)
            .filter(|r| from.is_none_or(|f| r.timestamp >= f))
            .filter(|r| to.is_none_or(|t| r.timestamp < t))
            .cloned()
            .collect();
        receipts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        Ok(receipts)
    }

    async fn update_receipt_content(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        content: &ReceiptContent,
    ) -> Result<Receipt, RepositoryError> {
        let mut tables = self.lock()?;
        let receipt = tables
            .receipts
            .get_mut(&id.as_i32())
            .filter(|r| r.shop_id == shop_id)
            .ok_or(RepositoryError::NotFound)?;
        receipt.items.clone_from(&content.items);
        receipt.total_amount = content.total_amount;
        receipt.discount = content.discount;
        receipt.payment_method = content.payment_method;
        receipt.timestamp = content.timestamp;
        receipt.updated_at = Utc::now();
        Ok(receipt.clone())
    }

    async fn delete_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let mut tables = self.lock()?;
        let owned = tables
            .receipts
            .get(&id.as_i32())
            .is_some_and(|r| r.shop_id == shop_id);
        if !owned {
            return Ok(None);
        }
        Ok(tables.receipts.remove(&id.as_i32()))
    }
}

impl AccountStore for MemoryStore {
    async fn create_account(&self, account: &NewShopAccount) -> Result<ShopAccount, RepositoryError> {
        let mut tables = self.lock()?;
        if tables
            .accounts
            .values()
            .any(|(a, _)| a.email == account.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let created = ShopAccount {
            id: ShopId::new(id),
            uid: Uuid::new_v4(),
            email: account.email.clone(),
            shop_name: account.shop_name.clone(),
            owner_name: account.owner_name.clone(),
            phone: None,
            address: None,
            failed_login_attempts: 0,
            locked_until: None,
            lock_duration_minutes: None,
            account_status: account.account_status,
            created_at: now,
            updated_at: now,
        };
        tables
            .accounts
            .insert(id, (created.clone(), account.password_hash.clone()));
        Ok(created)
    }

    async fn get_account(&self, id: ShopId) -> Result<Option<ShopAccount>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.accounts.get(&id.as_i32()).map(|(a, _)| a.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ShopAccount>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .accounts
            .values()
            .find(|(a, _)| &a.email == email)
            .map(|(a, _)| a.clone()))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(ShopAccount, String)>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .accounts
            .values()
            .find(|(a, _)| &a.email == email)
            .cloned())
    }

    async fn record_failed_attempt(&self, id: ShopId) -> Result<i32, RepositoryError> {
        let mut tables = self.lock()?;
        let account = tables.account_mut(id)?;
        account.failed_login_attempts += 1;
        account.updated_at = Utc::now();
        Ok(account.failed_login_attempts)
    }

    async fn lock_account(
        &self,
        id: ShopId,
        until: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let account = tables.account_mut(id)?;
        account.locked_until = Some(until);
        account.lock_duration_minutes = Some(duration_minutes);
        account.account_status = AccountStatus::Locked;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_lock(&self, id: ShopId) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let account = tables.account_mut(id)?;
        account.failed_login_attempts = 0;
        account.locked_until = None;
        account.lock_duration_minutes = None;
        if account.account_status == AccountStatus::Locked {
            account.account_status = AccountStatus::Active;
        }
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn set_account_status(
        &self,
        id: ShopId,
        status: AccountStatus,
    ) -> Result<ShopAccount, RepositoryError> {
        let mut tables = self.lock()?;
        let account = tables.account_mut(id)?;
        account.account_status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn save_profile(&self, account: &ShopAccount) -> Result<ShopAccount, RepositoryError> {
        let mut tables = self.lock()?;
        let stored = tables.account_mut(account.id)?;
        stored.shop_name.clone_from(&account.shop_name);
        stored.owner_name.clone_from(&account.owner_name);
        stored.phone.clone_from(&account.phone);
        stored.address.clone_from(&account.address);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopdesk_core::QuantityUnit;

    fn rice(quantity: Decimal) -> StockItemInput {
        StockItemInput {
            name: "Rice".to_owned(),
            category: "Grains".to_owned(),
            price: dec!(2),
            cost_price: dec!(1),
            quantity,
            quantity_unit: QuantityUnit::Kg,
        }
    }

    #[tokio::test]
    async fn test_stock_names_unique_ignoring_case() {
        let store = MemoryStore::new();
        let shop = ShopId::new(1);
        store.create_stock(shop, &rice(dec!(1))).await.unwrap();

        let mut dup = rice(dec!(1));
        dup.name = "RICE".to_owned();
        let err = store.create_stock(shop, &dup).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Another shop may use the same name.
        assert!(store.create_stock(ShopId::new(2), &dup).await.is_ok());
    }

    #[tokio::test]
    async fn test_adjust_clamps_at_zero() {
        let store = MemoryStore::new();
        let shop = ShopId::new(1);
        let item = store.create_stock(shop, &rice(dec!(3))).await.unwrap();

        let after = store
            .adjust_stock_quantity(shop, item.id, dec!(-10))
            .await
            .unwrap();
        assert_eq!(after, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_stock_scoped_by_shop() {
        let store = MemoryStore::new();
        let item = store
            .create_stock(ShopId::new(1), &rice(dec!(3)))
            .await
            .unwrap();

        assert!(store.get_stock(ShopId::new(2), item.id).await.unwrap().is_none());
        assert!(!store.delete_stock(ShopId::new(2), item.id).await.unwrap());
        assert!(store.delete_stock(ShopId::new(1), item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_lock_keeps_administrative_status() {
        let store = MemoryStore::new();
        let account = store
            .create_account(&NewShopAccount {
                email: Email::parse("owner@shop.com").unwrap(),
                password_hash: "hash".to_owned(),
                shop_name: "Corner".to_owned(),
                owner_name: "Sam".to_owned(),
                account_status: AccountStatus::Frozen,
            })
            .await
            .unwrap();

        store.record_failed_attempt(account.id).await.unwrap();
        store.clear_lock(account.id).await.unwrap();

        let reloaded = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.failed_login_attempts, 0);
        assert_eq!(reloaded.account_status, AccountStatus::Frozen);
    }
}
