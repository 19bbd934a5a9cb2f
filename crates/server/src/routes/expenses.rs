//! Expense routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use shopdesk_core::ExpenseId;

use crate::db::ExpenseRepository;
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{Expense, ExpenseInput};
use crate::state::AppState;

use super::DayRangeQuery;

/// GET /api/expenses
///
/// Most recent first; `from` and `to` are inclusive.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(range): Query<DayRangeQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    range.check()?;
    let expenses = ExpenseRepository::new(state.pool())
        .list(shop.shop_id, range.from, range.to)
        .await?;
    Ok(Json(expenses))
}

/// POST /api/expenses
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Json(input): Json<ExpenseInput>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let input = input.validated()?;
    let expense = ExpenseRepository::new(state.pool())
        .create(shop.shop_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, expense_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ExpenseId>,
    Json(input): Json<ExpenseInput>,
) -> Result<Json<Expense>, AppError> {
    let input = input.validated()?;
    let expense = ExpenseRepository::new(state.pool())
        .update(shop.shop_id, id, &input)
        .await?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, expense_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ExpenseId>,
) -> Result<StatusCode, AppError> {
    if ExpenseRepository::new(state.pool())
        .delete(shop.shop_id, id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("expense".to_string()))
    }
}
