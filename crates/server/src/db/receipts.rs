//! Receipt repository.
//!
//! A receipt is one row; its lines live in the `items` JSONB column so a sale
//! is written in a single statement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use shopdesk_core::{ReceiptId, ShopId};

use super::store::ReceiptStore;
use super::{RepositoryError, parse_column};
use crate::models::{NewReceipt, Receipt, ReceiptContent, ReceiptLine};

const RECEIPT_COLUMNS: &str = "id, shop_id, transaction_id, items, total_amount, discount, \
     payment_method, timestamp, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ReceiptRow {
    id: i32,
    shop_id: i32,
    transaction_id: String,
    items: Json<Vec<ReceiptLine>>,
    total_amount: Decimal,
    discount: Decimal,
    payment_method: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = RepositoryError;

    fn try_from(r: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReceiptId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            transaction_id: r.transaction_id,
            items: r.items.0,
            total_amount: r.total_amount,
            discount: r.discount,
            payment_method: parse_column("payment_method", &r.payment_method)?,
            timestamp: r.timestamp,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Repository for receipt database operations.
pub struct ReceiptRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReceiptRepository<'a> {
    /// Create a new receipt repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl ReceiptStore for ReceiptRepository<'_> {
    async fn create_receipt(&self, receipt: &NewReceipt) -> Result<Receipt, RepositoryError> {
        let content = &receipt.content;
        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            r"
            INSERT INTO shop.receipt
                (shop_id, transaction_id, items, total_amount, discount, payment_method, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RECEIPT_COLUMNS}
            "
        ))
        .bind(receipt.shop_id.as_i32())
        .bind(&receipt.transaction_id)
        .bind(Json(&content.items))
        .bind(content.total_amount)
        .bind(content.discount)
        .bind(content.payment_method.as_str())
        .bind(content.timestamp)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "transaction id already exists"))?;

        row.try_into()
    }

    async fn get_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM shop.receipt WHERE shop_id = $1 AND id = $2"
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Receipt::try_from).transpose()
    }

    async fn list_receipts(
        &self,
        shop_id: ShopId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Receipt>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
            r"
            SELECT {RECEIPT_COLUMNS}
            FROM shop.receipt
            WHERE shop_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR timestamp >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR timestamp < $3)
            ORDER BY timestamp DESC, id DESC
            "
        ))
        .bind(shop_id.as_i32())
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Receipt::try_from).collect()
    }

    async fn update_receipt_content(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
        content: &ReceiptContent,
    ) -> Result<Receipt, RepositoryError> {
        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            r"
            UPDATE shop.receipt
            SET items = $3, total_amount = $4, discount = $5, payment_method = $6,
                timestamp = $7, updated_at = NOW()
            WHERE shop_id = $1 AND id = $2
            RETURNING {RECEIPT_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .bind(Json(&content.items))
        .bind(content.total_amount)
        .bind(content.discount)
        .bind(content.payment_method.as_str())
        .bind(content.timestamp)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete_receipt(
        &self,
        shop_id: ShopId,
        id: ReceiptId,
    ) -> Result<Option<Receipt>, RepositoryError> {
        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            "DELETE FROM shop.receipt WHERE shop_id = $1 AND id = $2 RETURNING {RECEIPT_COLUMNS}"
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Receipt::try_from).transpose()
    }
}
