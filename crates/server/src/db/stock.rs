//! Stock item repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopdesk_core::{ShopId, StockItemId};

use super::store::StockStore;
use super::{RepositoryError, parse_column};
use crate::models::{StockItem, StockItemInput};

const STOCK_COLUMNS: &str = "id, shop_id, name, category, price, cost_price, quantity, \
     quantity_unit, created_at, updated_at";

const DUPLICATE_NAME: &str = "a stock item with this name already exists";

#[derive(sqlx::FromRow)]
struct StockRow {
    id: i32,
    shop_id: i32,
    name: String,
    category: String,
    price: Decimal,
    cost_price: Decimal,
    quantity: Decimal,
    quantity_unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StockRow> for StockItem {
    type Error = RepositoryError;

    fn try_from(r: StockRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StockItemId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            name: r.name,
            category: r.category,
            price: r.price,
            cost_price: r.cost_price,
            quantity: r.quantity,
            quantity_unit: parse_column("quantity_unit", &r.quantity_unit)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Repository for stock item database operations.
pub struct StockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockRepository<'a> {
    /// Create a new stock repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl StockStore for StockRepository<'_> {
    async fn list_stock(
        &self,
        shop_id: ShopId,
        category: Option<&str>,
    ) -> Result<Vec<StockItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            r"
            SELECT {STOCK_COLUMNS}
            FROM shop.stock_item
            WHERE shop_id = $1 AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY LOWER(name)
            "
        ))
        .bind(shop_id.as_i32())
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StockItem::try_from).collect()
    }

    async fn get_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
    ) -> Result<Option<StockItem>, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            "SELECT {STOCK_COLUMNS} FROM shop.stock_item WHERE shop_id = $1 AND id = $2"
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(StockItem::try_from).transpose()
    }

    async fn find_stock_by_name(
        &self,
        shop_id: ShopId,
        name: &str,
    ) -> Result<Option<StockItem>, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            r"
            SELECT {STOCK_COLUMNS}
            FROM shop.stock_item
            WHERE shop_id = $1 AND LOWER(name) = LOWER($2)
            "
        ))
        .bind(shop_id.as_i32())
        .bind(name.trim())
        .fetch_optional(self.pool)
        .await?;

        row.map(StockItem::try_from).transpose()
    }

    async fn create_stock(
        &self,
        shop_id: ShopId,
        input: &StockItemInput,
    ) -> Result<StockItem, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            r"
            INSERT INTO shop.stock_item
                (shop_id, name, category, price, cost_price, quantity, quantity_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {STOCK_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.quantity)
        .bind(input.quantity_unit.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_NAME))?;

        row.try_into()
    }

    async fn update_stock(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        input: &StockItemInput,
    ) -> Result<StockItem, RepositoryError> {
        let row = sqlx::query_as::<_, StockRow>(&format!(
            r"
            UPDATE shop.stock_item
            SET name = $3, category = $4, price = $5, cost_price = $6,
                quantity = $7, quantity_unit = $8, updated_at = NOW()
            WHERE shop_id = $1 AND id = $2
            RETURNING {STOCK_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.quantity)
        .bind(input.quantity_unit.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, DUPLICATE_NAME))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn adjust_stock_quantity(
        &self,
        shop_id: ShopId,
        id: StockItemId,
        delta: Decimal,
    ) -> Result<Decimal, RepositoryError> {
        let quantity: Option<Decimal> = sqlx::query_scalar(
            r"
            UPDATE shop.stock_item
            SET quantity = GREATEST(0, quantity + $3), updated_at = NOW()
            WHERE shop_id = $1 AND id = $2
            RETURNING quantity
            ",
        )
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        quantity.ok_or(RepositoryError::NotFound)
    }

    async fn delete_stock(&self, shop_id: ShopId, id: StockItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.stock_item WHERE shop_id = $1 AND id = $2")
            .bind(shop_id.as_i32())
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
