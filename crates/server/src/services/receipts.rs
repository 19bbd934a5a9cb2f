//! Receipt bookkeeping.
//!
//! Every write that changes what a receipt sold also moves stock through the
//! [`InventoryReconciler`]. The receipt row is written first and stock second;
//! the stock part is best-effort and its per-line report is returned with the
//! receipt.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use shopdesk_core::{ReceiptId, ShopId};

use super::clock::Clock;
use super::inventory::{InventoryReconciler, ReconcileReport};
use crate::db::{ReceiptStore, RepositoryError, StockStore};
use crate::models::{
    NewReceipt, Receipt, ReceiptContent, ReceiptInput, ReceiptLine, ReturnLine, ValidationError,
};
use crate::models::validation::positive_quantity;

/// Attempts at finding an unused transaction id.
const TRANSACTION_ID_ATTEMPTS: usize = 3;

/// Length of the random transaction id suffix.
const TRANSACTION_SUFFIX_LEN: usize = 4;

/// Errors from receipt operations.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("receipt not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A receipt together with what happened to stock.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptOutcome {
    pub receipt: Receipt,
    /// One report per stock movement, in the order they were applied.
    pub reconciliation: Vec<ReconcileReport>,
}

/// Receipt service.
pub struct ReceiptService<'a, R, S> {
    receipts: &'a R,
    stock: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, R: ReceiptStore, S: StockStore> ReceiptService<'a, R, S> {
    #[must_use]
    pub const fn new(receipts: &'a R, stock: &'a S, clock: &'a dyn Clock) -> Self {
        Self {
            receipts,
            stock,
            clock,
        }
    }

    fn reconciler(&self) -> InventoryReconciler<'a, S> {
        InventoryReconciler::new(self.stock)
    }

    /// Record a sale and take its lines out of stock.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::Validation` for an invalid receipt and
    /// `ReceiptError::Repository` if the receipt cannot be stored. Stock
    /// failures are reported in the outcome, not as errors.
    #[instrument(skip(self, input), fields(shop_id = %shop_id))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: ReceiptInput,
    ) -> Result<ReceiptOutcome, ReceiptError> {
        let input = input.validated()?;
        let timestamp = input.timestamp.unwrap_or_else(|| self.clock.now());
        let content =
            ReceiptContent::new(input.items, input.discount, input.payment_method, timestamp)?;

        let receipt = self.insert(shop_id, content).await?;
        info!(
            receipt_id = %receipt.id,
            transaction_id = %receipt.transaction_id,
            total = %receipt.total_amount,
            "receipt created"
        );

        let applied = self.reconciler().apply_sale(shop_id, &receipt.items).await;
        Ok(ReceiptOutcome {
            receipt,
            reconciliation: vec![applied],
        })
    }

    async fn insert(
        &self,
        shop_id: ShopId,
        content: ReceiptContent,
    ) -> Result<Receipt, RepositoryError> {
        let mut attempt = 1;
        loop {
            let new = NewReceipt {
                shop_id,
                transaction_id: generate_transaction_id(self.clock.now(), &mut rand::rng()),
                content: content.clone(),
            };
            match self.receipts.create_receipt(&new).await {
                Err(RepositoryError::Conflict(reason)) if attempt < TRANSACTION_ID_ATTEMPTS => {
                    warn!(attempt, %reason, "transaction id collision, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ReceiptError::NotFound` if the shop has no such receipt.
    pub async fn get(&self, shop_id: ShopId, id: ReceiptId) -> Result<Receipt, ReceiptError> {
        self.receipts
            .get_receipt(shop_id, id)
            .await?
            .ok_or(ReceiptError::NotFound)
    }

    /// Receipts in `[from, to)`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::Repository` if the query fails.
    pub async fn list(
        &self,
        shop_id: ShopId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Receipt>, ReceiptError> {
        Ok(self.receipts.list_receipts(shop_id, from, to).await?)
    }

    /// Replace a receipt's contents, moving stock from the old lines to the
    /// new ones. The timestamp is kept unless the input carries one.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::Validation` for invalid input and
    /// `ReceiptError::NotFound` if the shop has no such receipt.
    #[instrument(skip(self, input), fields(shop_id = %shop_id, receipt_id = %id))]
    pub async fn update(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        input: ReceiptInput,
    ) -> Result<ReceiptOutcome, ReceiptError> {
        let input = input.validated()?;
        let existing = self.get(shop_id, id).await?;

        let content = ReceiptContent::new(
            input.items,
            input.discount,
            input.payment_method,
            input.timestamp.unwrap_or(existing.timestamp),
        )?;
        let receipt = self.rewrite(shop_id, id, &content).await?;
        info!(total = %receipt.total_amount, "receipt edited");

        let reconciler = self.reconciler();
        let restored = reconciler.restore_sale(shop_id, &existing.items).await;
        let applied = reconciler.apply_sale(shop_id, &receipt.items).await;
        Ok(ReceiptOutcome {
            receipt,
            reconciliation: vec![restored, applied],
        })
    }

    /// Take items back from a customer.
    ///
    /// Returned quantities are removed from the receipt's lines, lines that
    /// reach zero are dropped, the total is recomputed and the goods go back
    /// into stock.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::Validation` if nothing is returned, a quantity is
    /// not positive or has more than three decimal places, or more is returned
    /// than the receipt sold under that name.
    /// Returns `ReceiptError::NotFound` if the shop has no such receipt.
    #[instrument(skip(self, returns), fields(shop_id = %shop_id, receipt_id = %id))]
    pub async fn return_items(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        returns: &[ReturnLine],
    ) -> Result<ReceiptOutcome, ReceiptError> {
        let existing = self.get(shop_id, id).await?;
        let (remaining, returned) = apply_returns(&existing.items, returns)?;

        let content = ReceiptContent::new(
            remaining,
            existing.discount,
            existing.payment_method,
            existing.timestamp,
        )?;
        let receipt = self.rewrite(shop_id, id, &content).await?;
        info!(
            lines_returned = returned.len(),
            total = %receipt.total_amount,
            "items returned"
        );

        let restored = self.reconciler().restore_sale(shop_id, &returned).await;
        Ok(ReceiptOutcome {
            receipt,
            reconciliation: vec![restored],
        })
    }

    /// Delete a receipt and put its lines back into stock.
    ///
    /// # Errors
    ///
    /// Returns `ReceiptError::NotFound` if the shop has no such receipt.
    #[instrument(skip(self), fields(shop_id = %shop_id, receipt_id = %id))]
    pub async fn delete(&self, shop_id: ShopId, id: ReceiptId) -> Result<ReceiptOutcome, ReceiptError> {
        let receipt = self
            .receipts
            .delete_receipt(shop_id, id)
            .await?
            .ok_or(ReceiptError::NotFound)?;
        info!(transaction_id = %receipt.transaction_id, "receipt deleted");

        let restored = self.reconciler().restore_sale(shop_id, &receipt.items).await;
        Ok(ReceiptOutcome {
            receipt,
            reconciliation: vec![restored],
        })
    }

    async fn rewrite(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        content: &ReceiptContent,
    ) -> Result<Receipt, ReceiptError> {
        self.receipts
            .update_receipt_content(shop_id, id, content)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ReceiptError::NotFound,
                other => ReceiptError::Repository(other),
            })
    }
}

/// `TXN-YYYYMMDDHHMMSS-XXXX` with an uppercase alphanumeric suffix.
pub fn generate_transaction_id<G: Rng>(now: DateTime<Utc>, rng: &mut G) -> String {
    let suffix: String = rng
        .sample_iter(Alphanumeric)
        .take(TRANSACTION_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("TXN-{}-{suffix}", now.format("%Y%m%d%H%M%S"))
}

/// Split `lines` into what stays on the receipt and what was returned.
fn apply_returns(
    lines: &[ReceiptLine],
    returns: &[ReturnLine],
) -> Result<(Vec<ReceiptLine>, Vec<ReceiptLine>), ValidationError> {
    if returns.is_empty() {
        return Err(ValidationError::new("returns", "nothing to return"));
    }

    let mut remaining = lines.to_vec();
    let mut returned = Vec::new();

    for ret in returns {
        positive_quantity("returns.quantity", ret.quantity)?;
        let key = ret.name.trim().to_lowercase();
        let sold: Decimal = remaining
            .iter()
            .filter(|l| l.name.trim().to_lowercase() == key)
            .map(|l| l.quantity)
            .sum();
        if sold.is_zero() {
            return Err(ValidationError::new(
                "returns.name",
                format!("{} is not on this receipt", ret.name.trim()),
            ));
        }
        if ret.quantity > sold {
            return Err(ValidationError::new(
                "returns.quantity",
                format!("cannot return {} of {}; only {sold} left", ret.quantity, ret.name.trim()),
            ));
        }

        let mut outstanding = ret.quantity;
        for line in remaining
            .iter_mut()
            .filter(|l| l.name.trim().to_lowercase() == key)
        {
            if outstanding.is_zero() {
                break;
            }
            let taken = outstanding.min(line.quantity);
            line.quantity -= taken;
            outstanding -= taken;
            returned.push(ReceiptLine {
                quantity: taken,
                ..line.clone()
            });
        }
    }

    remaining.retain(|l| !l.quantity.is_zero());
    Ok((remaining, returned))
}
