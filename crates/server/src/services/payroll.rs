//! Monthly salary computation from attendance.
//!
//! The daily rate is `monthly_salary / days_in_month`. An absent day deducts
//! one daily rate, a half day deducts half of one, and leave is paid. Days
//! without a mark count as present.

use rust_decimal::Decimal;
use serde::Serialize;

use shopdesk_core::{AttendanceStatus, EmployeeId, YearMonth, round_money};

use crate::models::{AttendanceRecord, Employee};

/// Computed pay for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalarySlip {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub month: YearMonth,
    pub days_in_month: u32,
    pub present_days: u32,
    pub half_days: u32,
    pub leave_days: u32,
    pub absent_days: u32,
    /// Days with no attendance mark.
    pub unmarked_days: u32,
    pub monthly_salary: Decimal,
    pub daily_rate: Decimal,
    pub deductions: Decimal,
    pub payable: Decimal,
}

/// Compute the slip for `employee` in `month`.
///
/// Records for other employees or other months are ignored.
#[must_use]
pub fn compute(employee: &Employee, attendance: &[AttendanceRecord], month: YearMonth) -> SalarySlip {
    let mut present_days = 0;
    let mut half_days = 0;
    let mut leave_days = 0;
    let mut absent_days = 0;

    for record in attendance
        .iter()
        .filter(|r| r.employee_id == employee.id && month.contains(r.date))
    {
        match record.status {
            AttendanceStatus::Present => present_days += 1,
            AttendanceStatus::HalfDay => half_days += 1,
            AttendanceStatus::Leave => leave_days += 1,
            AttendanceStatus::Absent => absent_days += 1,
        }
    }

    let days_in_month = month.days();
    let marked = present_days + half_days + leave_days + absent_days;
    let daily_rate = employee.monthly_salary / Decimal::from(days_in_month);
    let deducted_days = Decimal::from(absent_days) + Decimal::from(half_days) / Decimal::TWO;
    let deductions = round_money(daily_rate * deducted_days).min(employee.monthly_salary);

    SalarySlip {
        employee_id: employee.id,
        employee_name: employee.name.clone(),
        month,
        days_in_month,
        present_days,
        half_days,
        leave_days,
        absent_days,
        unmarked_days: days_in_month.saturating_sub(marked),
        monthly_salary: employee.monthly_salary,
        daily_rate: round_money(daily_rate),
        deductions,
        payable: employee.monthly_salary - deductions,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use shopdesk_core::{AttendanceId, ShopId};

    fn employee(salary: Decimal) -> Employee {
        Employee {
            id: EmployeeId::new(1),
            shop_id: ShopId::new(1),
            name: "Priya".to_owned(),
            phone: None,
            position: None,
            monthly_salary: salary,
            joined_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn mark(employee: i32, day: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id: AttendanceId::new(i32::try_from(day).unwrap()),
            shop_id: ShopId::new(1),
            employee_id: EmployeeId::new(employee),
            date: NaiveDate::from_ymd_opt(2026, 9, day).unwrap(),
            status,
            note: None,
        }
    }

    #[test]
    fn test_full_attendance_is_paid_in_full() {
        let month: YearMonth = "2026-09".parse().unwrap();
        let slip = compute(&employee(dec!(30000)), &[], month);
        assert_eq!(slip.days_in_month, 30);
        assert_eq!(slip.unmarked_days, 30);
        assert_eq!(slip.daily_rate, dec!(1000));
        assert_eq!(slip.payable, dec!(30000));
    }

    #[test]
    fn test_absent_and_half_days_are_deducted_leave_is_paid() {
        let month: YearMonth = "2026-09".parse().unwrap();
        let attendance = vec![
            mark(1, 1, AttendanceStatus::Present),
            mark(1, 2, AttendanceStatus::Absent),
            mark(1, 3, AttendanceStatus::Absent),
            mark(1, 4, AttendanceStatus::HalfDay),
            mark(1, 5, AttendanceStatus::Leave),
            // Another employee's absence does not count.
            mark(2, 6, AttendanceStatus::Absent),
        ];
        let slip = compute(&employee(dec!(30000)), &attendance, month);

        assert_eq!(slip.absent_days, 2);
        assert_eq!(slip.half_days, 1);
        assert_eq!(slip.leave_days, 1);
        assert_eq!(slip.present_days, 1);
        assert_eq!(slip.deductions, dec!(2500));
        assert_eq!(slip.payable, dec!(27500));
    }

    #[test]
    fn test_rounding_of_uneven_daily_rate() {
        let month: YearMonth = "2026-09".parse().unwrap();
        let slip = compute(
            &employee(dec!(10000)),
            &[mark(1, 1, AttendanceStatus::Absent)],
            month,
        );
        assert_eq!(slip.daily_rate, dec!(333.33));
        assert_eq!(slip.deductions, dec!(333.33));
        assert_eq!(slip.payable, dec!(9666.67));
    }
}
