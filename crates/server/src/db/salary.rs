//! Salary payment repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopdesk_core::{EmployeeId, SalaryPaymentId, ShopId, YearMonth};

use super::{RepositoryError, parse_column};
use crate::models::{SalaryPayment, SalaryPaymentInput};

const PAYMENT_COLUMNS: &str = "id, shop_id, employee_id, month, amount, paid_on, note, created_at";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    shop_id: i32,
    employee_id: i32,
    month: String,
    amount: Decimal,
    paid_on: NaiveDate,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for SalaryPayment {
    type Error = RepositoryError;

    fn try_from(r: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SalaryPaymentId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            employee_id: EmployeeId::new(r.employee_id),
            month: parse_column("month", &r.month)?,
            amount: r.amount,
            paid_on: r.paid_on,
            note: r.note,
            created_at: r.created_at,
        })
    }
}

/// Repository for salary payment database operations.
pub struct SalaryPaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SalaryPaymentRepository<'a> {
    /// Create a new salary payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a payment. The employee must belong to `shop_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &SalaryPaymentInput,
    ) -> Result<SalaryPayment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r"
            INSERT INTO shop.salary_payment (shop_id, employee_id, month, amount, paid_on, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(input.employee_id.as_i32())
        .bind(input.month.to_string())
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(input.note.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Payments recorded against a month, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_month(
        &self,
        shop_id: ShopId,
        month: YearMonth,
    ) -> Result<Vec<SalaryPayment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r"
            SELECT {PAYMENT_COLUMNS}
            FROM shop.salary_payment
            WHERE shop_id = $1 AND month = $2
            ORDER BY paid_on, id
            "
        ))
        .bind(shop_id.as_i32())
        .bind(month.to_string())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SalaryPayment::try_from).collect()
    }
}
