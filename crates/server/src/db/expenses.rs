//! Expense repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopdesk_core::{ExpenseId, ShopId};

use super::{RepositoryError, parse_column};
use crate::models::{Expense, ExpenseInput};

const EXPENSE_COLUMNS: &str =
    "id, shop_id, category, description, amount, spent_on, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i32,
    shop_id: i32,
    category: String,
    description: String,
    amount: Decimal,
    spent_on: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = RepositoryError;

    fn try_from(r: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ExpenseId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            category: parse_column("category", &r.category)?,
            description: r.description,
            amount: r.amount,
            spent_on: r.spent_on,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Repository for expense database operations.
pub struct ExpenseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExpenseRepository<'a> {
    /// Create a new expense repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Expenses with `from <= spent_on <= to`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        shop_id: ShopId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            r"
            SELECT {EXPENSE_COLUMNS}
            FROM shop.expense
            WHERE shop_id = $1
              AND ($2::DATE IS NULL OR spent_on >= $2)
              AND ($3::DATE IS NULL OR spent_on <= $3)
            ORDER BY spent_on DESC, id DESC
            "
        ))
        .bind(shop_id.as_i32())
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    /// Record an expense.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &ExpenseInput,
    ) -> Result<Expense, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r"
            INSERT INTO shop.expense (shop_id, category, description, amount, spent_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EXPENSE_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(input.category.as_str())
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.spent_on)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Overwrite an expense.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the expense does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        shop_id: ShopId,
        id: ExpenseId,
        input: &ExpenseInput,
    ) -> Result<Expense, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r"
            UPDATE shop.expense
            SET category = $3, description = $4, amount = $5, spent_on = $6, updated_at = NOW()
            WHERE shop_id = $1 AND id = $2
            RETURNING {EXPENSE_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .bind(input.category.as_str())
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.spent_on)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an expense.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, shop_id: ShopId, id: ExpenseId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.expense WHERE shop_id = $1 AND id = $2")
            .bind(shop_id.as_i32())
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
