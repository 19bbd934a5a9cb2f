//! Employees, attendance and salary.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, instrument};

use shopdesk_core::{EmployeeId, ShopId, YearMonth};

use crate::db::{AttendanceRepository, EmployeeRepository, SalaryPaymentRepository};
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::staff::optional_text;
use crate::models::{
    AttendanceInput, AttendanceRecord, Employee, EmployeeInput, SalaryPayment, SalaryPaymentInput,
};
use crate::services::payroll::{self, SalarySlip};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<YearMonth>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl MonthQuery {
    fn or_current(&self, state: &AppState) -> YearMonth {
        self.month
            .unwrap_or_else(|| YearMonth::of(state.clock().now().date_naive()))
    }
}

async fn find_employee(
    state: &AppState,
    shop_id: ShopId,
    id: EmployeeId,
) -> Result<Employee, AppError> {
    EmployeeRepository::new(state.pool())
        .get(shop_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("employee".to_string()))
}

/// GET /api/employees
///
/// Active employees first, then by name.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = EmployeeRepository::new(state.pool())
        .list(shop.shop_id)
        .await?;
    Ok(Json(employees))
}

/// POST /api/employees
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let input = input.validated()?;
    let employee = EmployeeRepository::new(state.pool())
        .create(shop.shop_id, &input)
        .await?;
    info!(employee_id = %employee.id, "employee added");
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /api/employees/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, employee_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<EmployeeId>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(find_employee(&state, shop.shop_id, id).await?))
}

/// PUT /api/employees/{id}
///
/// Also used to deactivate an employee (`"active": false`).
#[instrument(skip_all, fields(shop_id = %shop.shop_id, employee_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<EmployeeId>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Employee>, AppError> {
    let input = input.validated()?;
    let employee = EmployeeRepository::new(state.pool())
        .update(shop.shop_id, id, &input)
        .await?;
    Ok(Json(employee))
}

/// DELETE /api/employees/{id}
///
/// Removes the employee with their attendance and payment history.
#[instrument(skip_all, fields(shop_id = %shop.shop_id, employee_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<EmployeeId>,
) -> Result<StatusCode, AppError> {
    if EmployeeRepository::new(state.pool())
        .delete(shop.shop_id, id)
        .await?
    {
        info!("employee deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("employee".to_string()))
    }
}

/// GET /api/employees/{id}/attendance
#[instrument(skip_all, fields(shop_id = %shop.shop_id, employee_id = %id))]
pub async fn attendance(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<EmployeeId>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let employee = find_employee(&state, shop.shop_id, id).await?;
    let records = AttendanceRepository::new(state.pool())
        .list_for_employee(shop.shop_id, employee.id, query.or_current(&state))
        .await?;
    Ok(Json(records))
}

/// POST /api/employees/{id}/attendance
///
/// Marking the same day twice replaces the earlier mark.
#[instrument(skip_all, fields(shop_id = %shop.shop_id, employee_id = %id))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<EmployeeId>,
    Json(input): Json<AttendanceInput>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let employee = find_employee(&state, shop.shop_id, id).await?;
    let input = AttendanceInput {
        note: optional_text(input.note),
        ..input
    };
    let record = AttendanceRepository::new(state.pool())
        .upsert(shop.shop_id, employee.id, &input)
        .await?;
    Ok(Json(record))
}

/// GET /api/attendance
///
/// Every mark on one day, today by default.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn attendance_by_date(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let date = query
        .date
        .unwrap_or_else(|| state.clock().now().date_naive());
    let records = AttendanceRepository::new(state.pool())
        .list_for_date(shop.shop_id, date)
        .await?;
    Ok(Json(records))
}

/// GET /api/salary
///
/// A slip for every active employee.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn salary(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<SalarySlip>>, AppError> {
    let month = query.or_current(&state);
    let employees = EmployeeRepository::new(state.pool())
        .list(shop.shop_id)
        .await?;
    let attendance = AttendanceRepository::new(state.pool())
        .list_for_month(shop.shop_id, month)
        .await?;

    let slips = employees
        .iter()
        .filter(|e| e.active)
        .map(|e| payroll::compute(e, &attendance, month))
        .collect();
    Ok(Json(slips))
}

/// GET /api/salary/payments
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn payments(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<SalaryPayment>>, AppError> {
    let payments = SalaryPaymentRepository::new(state.pool())
        .list_for_month(shop.shop_id, query.or_current(&state))
        .await?;
    Ok(Json(payments))
}

/// POST /api/salary/payments
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn record_payment(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Json(input): Json<SalaryPaymentInput>,
) -> Result<(StatusCode, Json<SalaryPayment>), AppError> {
    let input = input.validated()?;
    let employee = find_employee(&state, shop.shop_id, input.employee_id).await?;
    let payment = SalaryPaymentRepository::new(state.pool())
        .create(shop.shop_id, &input)
        .await?;
    info!(
        employee_id = %employee.id,
        month = %payment.month,
        amount = %payment.amount,
        "salary payment recorded"
    );
    Ok((StatusCode::CREATED, Json(payment)))
}
