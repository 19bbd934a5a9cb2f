//! Employee, attendance and salary payment domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopdesk_core::{
    AttendanceId, AttendanceStatus, EmployeeId, SalaryPaymentId, ShopId, YearMonth,
};

use super::validation::{ValidationError, money, positive_money, required_text};

/// A member of the shop's staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub shop_id: ShopId,
    pub name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    /// Gross salary for a full month.
    pub monthly_salary: Decimal,
    pub joined_on: NaiveDate,
    /// Inactive employees are kept for history but excluded from payroll.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee fields accepted from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub monthly_salary: Decimal,
    pub joined_on: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl EmployeeInput {
    /// Validate and normalize the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a blank name or a salary that is negative or too large.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", &self.name)?,
            phone: optional_text(self.phone),
            position: optional_text(self.position),
            monthly_salary: money("monthly_salary", self.monthly_salary)?,
            joined_on: self.joined_on,
            active: self.active,
        })
    }
}

/// Attendance for one employee on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub shop_id: ShopId,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

/// Attendance mark accepted from the API. Re-marking a day replaces it.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

/// A salary payout recorded against a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryPayment {
    pub id: SalaryPaymentId,
    pub shop_id: ShopId,
    pub employee_id: EmployeeId,
    pub month: YearMonth,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Salary payment accepted from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryPaymentInput {
    pub employee_id: EmployeeId,
    pub month: YearMonth,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub note: Option<String>,
}

impl SalaryPaymentInput {
    /// Validate the input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is not positive or too large.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: positive_money("amount", self.amount)?,
            note: optional_text(self.note),
            ..self
        })
    }
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_employee_input_defaults_active() {
        let input: EmployeeInput = serde_json::from_str(
            r#"{"name":"Priya","monthly_salary":"12000","joined_on":"2026-01-05"}"#,
        )
        .unwrap();
        assert!(input.active);
    }

    #[test]
    fn test_employee_input_blank_optional_fields_become_none() {
        let input = EmployeeInput {
            name: " Priya ".to_owned(),
            phone: Some("  ".to_owned()),
            position: Some("Cashier".to_owned()),
            monthly_salary: dec!(12000),
            joined_on: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            active: true,
        }
        .validated()
        .unwrap();
        assert_eq!(input.name, "Priya");
        assert_eq!(input.phone, None);
        assert_eq!(input.position.as_deref(), Some("Cashier"));
    }

    #[test]
    fn test_salary_payment_requires_positive_amount() {
        let input = SalaryPaymentInput {
            employee_id: EmployeeId::new(1),
            month: "2026-09".parse().unwrap(),
            amount: Decimal::ZERO,
            paid_on: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            note: None,
        };
        assert_eq!(input.validated().unwrap_err().field, "amount");
    }
}
