//! Inventory reconciliation for receipts.
//!
//! Saving a receipt takes its quantities out of stock; deleting it puts them
//! back. Lines refer to stock by name, matched case-insensitively, and are only
//! applied when the sold unit matches the unit the item is tracked in.
//!
//! Each line is reconciled on its own. A failure on one line is reported and
//! logged but does not undo the lines already applied. Every adjustment is a
//! single clamped update in the store, so concurrent receipts against the same
//! item cannot overwrite each other's decrement.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use shopdesk_core::{QuantityUnit, ShopId, StockItemId};

use crate::db::StockStore;
use crate::models::ReceiptLine;

/// Which way stock moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Goods left the shop.
    Sale,
    /// Goods came back (receipt deleted, edited or returned).
    Restore,
}

impl Direction {
    fn delta(self, quantity: Decimal) -> Decimal {
        match self {
            Self::Sale => -quantity,
            Self::Restore => quantity,
        }
    }
}

/// What happened to one receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LineOutcome {
    /// Stock was changed. `before` is the quantity seen at lookup.
    Adjusted {
        item_id: StockItemId,
        before: Decimal,
        after: Decimal,
    },
    /// No stock item carries this name.
    SkippedNotFound,
    /// The item is tracked in a different unit; stock left untouched.
    SkippedUnitMismatch {
        stock_unit: QuantityUnit,
        sold_unit: QuantityUnit,
    },
    /// The lookup or update failed.
    Failed { error: String },
}

/// Outcome of one line together with what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub name: String,
    pub quantity: Decimal,
    #[serde(flatten)]
    pub outcome: LineOutcome,
}

/// Per-line results of reconciling one receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub direction: Direction,
    pub lines: Vec<LineReport>,
}

impl ReconcileReport {
    /// Number of lines that changed stock.
    #[must_use]
    pub fn adjusted(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l.outcome, LineOutcome::Adjusted { .. }))
            .count()
    }

    /// Whether any line failed outright.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.lines
            .iter()
            .any(|l| matches!(l.outcome, LineOutcome::Failed { .. }))
    }
}

/// Applies receipt lines to stock.
pub struct InventoryReconciler<'a, S> {
    stock: &'a S,
}

impl<'a, S: StockStore> InventoryReconciler<'a, S> {
    #[must_use]
    pub const fn new(stock: &'a S) -> Self {
        Self { stock }
    }

    /// Take sold quantities out of stock, clamping at zero.
    #[instrument(skip(self, lines), fields(shop_id = %shop_id, lines = lines.len()))]
    pub async fn apply_sale(&self, shop_id: ShopId, lines: &[ReceiptLine]) -> ReconcileReport {
        self.reconcile(shop_id, lines, Direction::Sale).await
    }

    /// Put quantities back into stock.
    #[instrument(skip(self, lines), fields(shop_id = %shop_id, lines = lines.len()))]
    pub async fn restore_sale(&self, shop_id: ShopId, lines: &[ReceiptLine]) -> ReconcileReport {
        self.reconcile(shop_id, lines, Direction::Restore).await
    }

    async fn reconcile(
        &self,
        shop_id: ShopId,
        lines: &[ReceiptLine],
        direction: Direction,
    ) -> ReconcileReport {
        let mut reports = Vec::with_capacity(lines.len());
        for line in lines {
            let outcome = self.reconcile_line(shop_id, line, direction).await;
            if let LineOutcome::Failed { error } = &outcome {
                warn!(
                    shop_id = %shop_id,
                    item = %line.name,
                    ?direction,
                    error = %error,
                    "stock adjustment failed"
                );
            }
            reports.push(LineReport {
                name: line.name.clone(),
                quantity: line.quantity,
                outcome,
            });
        }
        ReconcileReport {
            direction,
            lines: reports,
        }
    }

    async fn reconcile_line(
        &self,
        shop_id: ShopId,
        line: &ReceiptLine,
        direction: Direction,
    ) -> LineOutcome {
        let item = match self.stock.find_stock_by_name(shop_id, &line.name).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!(item = %line.name, "no stock item for receipt line");
                return LineOutcome::SkippedNotFound;
            }
            Err(e) => {
                return LineOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        if !item.quantity_unit.is_compatible_with(line.quantity_unit) {
            debug!(
                item = %line.name,
                stock_unit = %item.quantity_unit,
                sold_unit = %line.quantity_unit,
                "unit mismatch, stock left unchanged"
            );
            return LineOutcome::SkippedUnitMismatch {
                stock_unit: item.quantity_unit,
                sold_unit: line.quantity_unit,
            };
        }

        match self
            .stock
            .adjust_stock_quantity(shop_id, item.id, direction.delta(line.quantity))
            .await
        {
            Ok(after) => LineOutcome::Adjusted {
                item_id: item.id,
                before: item.quantity,
                after,
            },
            Err(e) => LineOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::StockItemInput;
    use crate::models::receipt::fixtures::line;
    use rust_decimal_macros::dec;

    const SHOP: ShopId = ShopId::new(1);

    async fn stock(store: &MemoryStore, name: &str, quantity: Decimal, unit: QuantityUnit) -> StockItemId {
        store
            .create_stock(
                SHOP,
                &StockItemInput {
                    name: name.to_owned(),
                    category: String::new(),
                    price: dec!(1),
                    cost_price: dec!(0.5),
                    quantity,
                    quantity_unit: unit,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn quantity(store: &MemoryStore, id: StockItemId) -> Decimal {
        store.get_stock(SHOP, id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_sale_decrements_by_case_insensitive_name() {
        let store = MemoryStore::new();
        let id = stock(&store, "Green Tea", dec!(10), QuantityUnit::Units).await;

        let report = InventoryReconciler::new(&store)
            .apply_sale(SHOP, &[line("  green TEA ", dec!(2), dec!(3))])
            .await;

        assert_eq!(
            report.lines[0].outcome,
            LineOutcome::Adjusted {
                item_id: id,
                before: dec!(10),
                after: dec!(7)
            }
        );
        assert_eq!(quantity(&store, id).await, dec!(7));
    }

    #[tokio::test]
    async fn test_oversell_clamps_to_zero() {
        let store = MemoryStore::new();
        let id = stock(&store, "Milk", dec!(2), QuantityUnit::Units).await;

        InventoryReconciler::new(&store)
            .apply_sale(SHOP, &[line("Milk", dec!(1), dec!(5))])
            .await;

        assert_eq!(quantity(&store, id).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_restore_is_symmetric() {
        let store = MemoryStore::new();
        let id = stock(&store, "Sugar", dec!(4.5), QuantityUnit::Units).await;
        let lines = [line("Sugar", dec!(1), dec!(1.5))];
        let reconciler = InventoryReconciler::new(&store);

        reconciler.apply_sale(SHOP, &lines).await;
        assert_eq!(quantity(&store, id).await, dec!(3.0));
        reconciler.restore_sale(SHOP, &lines).await;
        assert_eq!(quantity(&store, id).await, dec!(4.5));
    }

    #[tokio::test]
    async fn test_unit_mismatch_skips_adjustment() {
        let store = MemoryStore::new();
        let id = stock(&store, "Rice", dec!(10), QuantityUnit::Units).await;
        let mut sold = line("Rice", dec!(2), dec!(1));
        sold.quantity_unit = QuantityUnit::Kg;

        let report = InventoryReconciler::new(&store).apply_sale(SHOP, &[sold]).await;

        assert_eq!(
            report.lines[0].outcome,
            LineOutcome::SkippedUnitMismatch {
                stock_unit: QuantityUnit::Units,
                sold_unit: QuantityUnit::Kg
            }
        );
        assert_eq!(quantity(&store, id).await, dec!(10));
        assert_eq!(report.adjusted(), 0);
    }

    #[tokio::test]
    async fn test_unit_mismatch_skips_restore() {
        let store = MemoryStore::new();
        let id = stock(&store, "Flour", dec!(8), QuantityUnit::Units).await;
        let mut sold = line("Flour", dec!(3), dec!(2));
        sold.quantity_unit = QuantityUnit::Kg;

        let report = InventoryReconciler::new(&store).restore_sale(SHOP, &[sold]).await;

        assert_eq!(
            report.lines[0].outcome,
            LineOutcome::SkippedUnitMismatch {
                stock_unit: QuantityUnit::Units,
                sold_unit: QuantityUnit::Kg
            }
        );
        assert_eq!(quantity(&store, id).await, dec!(8));
    }

    #[tokio::test]
    async fn test_unknown_item_is_skipped() {
        let store = MemoryStore::new();
        let report = InventoryReconciler::new(&store)
            .apply_sale(SHOP, &[line("Ghost", dec!(1), dec!(1))])
            .await;
        assert_eq!(report.lines[0].outcome, LineOutcome::SkippedNotFound);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_failure_does_not_undo_other_lines() {
        let store = MemoryStore::new();
        let tea = stock(&store, "Tea", dec!(5), QuantityUnit::Units).await;
        let milk = stock(&store, "Milk", dec!(5), QuantityUnit::Units).await;
        store.fail_adjustments(milk).unwrap();

        let report = InventoryReconciler::new(&store)
            .apply_sale(
                SHOP,
                &[line("Tea", dec!(1), dec!(2)), line("Milk", dec!(1), dec!(2))],
            )
            .await;

        assert!(report.has_failures());
        assert_eq!(report.adjusted(), 1);
        assert_eq!(quantity(&store, tea).await, dec!(3));
        assert_eq!(quantity(&store, milk).await, dec!(5));
    }

    #[tokio::test]
    async fn test_other_shop_stock_is_not_touched() {
        let store = MemoryStore::new();
        let id = stock(&store, "Tea", dec!(5), QuantityUnit::Units).await;

        let report = InventoryReconciler::new(&store)
            .apply_sale(ShopId::new(2), &[line("Tea", dec!(1), dec!(2))])
            .await;

        assert_eq!(report.lines[0].outcome, LineOutcome::SkippedNotFound);
        assert_eq!(quantity(&store, id).await, dec!(5));
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = LineReport {
            name: "Tea".to_owned(),
            quantity: dec!(1),
            outcome: LineOutcome::SkippedNotFound,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "skipped_not_found");
        assert_eq!(json["name"], "Tea");
    }
}
