//! Integration tests for Shopdesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopdesk-integration-tests
//! ```
//!
//! Service tests run over [`MemoryStore`] with a [`FixedClock`] and need no
//! database. Router tests use a pool that never connects and only exercise
//! paths that stop before the first query.
//!
//! # Test Categories
//!
//! - `receipt_lifecycle` - receipts moving stock through create, edit, return, delete
//! - `login_lockout` - failed sign-ins, temporary locks and administrative blocks
//! - `analytics_report` - reports over receipts recorded through the service
//! - `api_router` - HTTP surface, auth guard and sign-in rate limit

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use shopdesk_core::{PaymentMethod, QuantityUnit, ShopId, StockItemId};
use shopdesk_server::db::StockStore;
use shopdesk_server::db::memory::MemoryStore;
use shopdesk_server::models::{ReceiptInput, ReceiptLine, StockItemInput};
use shopdesk_server::services::clock::FixedClock;
use shopdesk_server::services::{ReceiptService, SignUp};

/// Shop used by most tests.
pub const SHOP: ShopId = ShopId::new(1);

/// Tests start at 2026-10-01 09:00 UTC.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
}

/// An in-memory shop: one store for stock, receipts and accounts, and a clock.
pub struct TestShop {
    pub store: MemoryStore,
    pub clock: FixedClock,
}

impl Default for TestShop {
    fn default() -> Self {
        Self::new()
    }
}

impl TestShop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            clock: FixedClock::new(start_time()),
        }
    }

    /// Receipt service over this shop's store and clock.
    #[must_use]
    pub fn receipts(&self) -> ReceiptService<'_, MemoryStore, MemoryStore> {
        ReceiptService::new(&self.store, &self.store, &self.clock)
    }

    /// Add a stock item and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the item cannot be created.
    #[allow(clippy::unwrap_used)]
    pub async fn stock(&self, name: &str, quantity: Decimal, unit: QuantityUnit) -> StockItemId {
        self.store
            .create_stock(
                SHOP,
                &StockItemInput {
                    name: name.to_owned(),
                    category: "General".to_owned(),
                    price: Decimal::ONE,
                    cost_price: Decimal::ZERO,
                    quantity,
                    quantity_unit: unit,
                },
            )
            .await
            .unwrap()
            .id
    }

    /// Current quantity of a stock item.
    ///
    /// # Panics
    ///
    /// Panics if the item does not exist.
    #[allow(clippy::unwrap_used)]
    pub async fn quantity(&self, id: StockItemId) -> Decimal {
        self.store
            .get_stock(SHOP, id)
            .await
            .unwrap()
            .unwrap()
            .quantity
    }
}

/// A receipt line in whole units.
#[must_use]
pub fn line(name: &str, price: Decimal, quantity: Decimal) -> ReceiptLine {
    ReceiptLine {
        name: name.to_owned(),
        price,
        quantity,
        quantity_unit: QuantityUnit::Units,
        cost_price: Decimal::ZERO,
    }
}

/// A cash sale of `items`, timestamped by the service clock.
#[must_use]
pub fn sale(items: Vec<ReceiptLine>) -> ReceiptInput {
    ReceiptInput {
        items,
        discount: Decimal::ZERO,
        payment_method: PaymentMethod::Cash,
        timestamp: None,
    }
}

/// Sign-up details for a test shop.
#[must_use]
pub const fn sign_up<'r>(email: &'r str, password: &'r str) -> SignUp<'r> {
    SignUp {
        email,
        password,
        shop_name: "Corner Shop",
        owner_name: "Asha Rao",
    }
}
