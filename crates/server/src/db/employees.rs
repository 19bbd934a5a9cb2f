//! Employee repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopdesk_core::{EmployeeId, ShopId};

use super::RepositoryError;
use crate::models::{Employee, EmployeeInput};

const EMPLOYEE_COLUMNS: &str = "id, shop_id, name, phone, position, monthly_salary, joined_on, \
     active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: i32,
    shop_id: i32,
    name: String,
    phone: Option<String>,
    position: Option<String>,
    monthly_salary: Decimal,
    joined_on: NaiveDate,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(r: EmployeeRow) -> Self {
        Self {
            id: EmployeeId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            name: r.name,
            phone: r.phone,
            position: r.position,
            monthly_salary: r.monthly_salary,
            joined_on: r.joined_on,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for employee database operations.
pub struct EmployeeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmployeeRepository<'a> {
    /// Create a new employee repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a shop's employees, active ones first, then by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, shop_id: ShopId) -> Result<Vec<Employee>, RepositoryError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            SELECT {EMPLOYEE_COLUMNS}
            FROM shop.employee
            WHERE shop_id = $1
            ORDER BY active DESC, LOWER(name)
            "
        ))
        .bind(shop_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    /// Get an employee by ID within a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        shop_id: ShopId,
        id: EmployeeId,
    ) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM shop.employee WHERE shop_id = $1 AND id = $2"
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Employee::from))
    }

    /// Create an employee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        shop_id: ShopId,
        input: &EmployeeInput,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            INSERT INTO shop.employee
                (shop_id, name, phone, position, monthly_salary, joined_on, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EMPLOYEE_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(&input.name)
        .bind(input.phone.as_deref())
        .bind(input.position.as_deref())
        .bind(input.monthly_salary)
        .bind(input.joined_on)
        .bind(input.active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Overwrite an employee's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the employee does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        shop_id: ShopId,
        id: EmployeeId,
        input: &EmployeeInput,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r"
            UPDATE shop.employee
            SET name = $3, phone = $4, position = $5, monthly_salary = $6,
                joined_on = $7, active = $8, updated_at = NOW()
            WHERE shop_id = $1 AND id = $2
            RETURNING {EMPLOYEE_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.phone.as_deref())
        .bind(input.position.as_deref())
        .bind(input.monthly_salary)
        .bind(input.joined_on)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an employee together with their attendance and payments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, shop_id: ShopId, id: EmployeeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.employee WHERE shop_id = $1 AND id = $2")
            .bind(shop_id.as_i32())
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
