//! Attendance repository. One row per employee per day.

use chrono::NaiveDate;
use sqlx::PgPool;

use shopdesk_core::{AttendanceId, EmployeeId, ShopId, YearMonth};

use super::{RepositoryError, parse_column};
use crate::models::{AttendanceInput, AttendanceRecord};

const ATTENDANCE_COLUMNS: &str = "id, shop_id, employee_id, date, status, note";

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: i32,
    shop_id: i32,
    employee_id: i32,
    date: NaiveDate,
    status: String,
    note: Option<String>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = RepositoryError;

    fn try_from(r: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttendanceId::new(r.id),
            shop_id: ShopId::new(r.shop_id),
            employee_id: EmployeeId::new(r.employee_id),
            date: r.date,
            status: parse_column("attendance status", &r.status)?,
            note: r.note,
        })
    }
}

/// Repository for attendance database operations.
pub struct AttendanceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttendanceRepository<'a> {
    /// Create a new attendance repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Mark a day for an employee, replacing any earlier mark for that day.
    ///
    /// The caller must have checked that the employee belongs to `shop_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        shop_id: ShopId,
        employee_id: EmployeeId,
        input: &AttendanceInput,
    ) -> Result<AttendanceRecord, RepositoryError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            INSERT INTO shop.attendance (shop_id, employee_id, date, status, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (employee_id, date)
            DO UPDATE SET status = EXCLUDED.status, note = EXCLUDED.note
            RETURNING {ATTENDANCE_COLUMNS}
            "
        ))
        .bind(shop_id.as_i32())
        .bind(employee_id.as_i32())
        .bind(input.date)
        .bind(input.status.as_str())
        .bind(input.note.as_deref())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// An employee's attendance within a month, by date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_employee(
        &self,
        shop_id: ShopId,
        employee_id: EmployeeId,
        month: YearMonth,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            SELECT {ATTENDANCE_COLUMNS}
            FROM shop.attendance
            WHERE shop_id = $1 AND employee_id = $2 AND date BETWEEN $3 AND $4
            ORDER BY date
            "
        ))
        .bind(shop_id.as_i32())
        .bind(employee_id.as_i32())
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    /// Every employee's attendance for a month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_month(
        &self,
        shop_id: ShopId,
        month: YearMonth,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            SELECT {ATTENDANCE_COLUMNS}
            FROM shop.attendance
            WHERE shop_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY employee_id, date
            "
        ))
        .bind(shop_id.as_i32())
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    /// Attendance marked on one day.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_date(
        &self,
        shop_id: ShopId,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r"
            SELECT {ATTENDANCE_COLUMNS}
            FROM shop.attendance
            WHERE shop_id = $1 AND date = $2
            ORDER BY employee_id
            "
        ))
        .bind(shop_id.as_i32())
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }
}
