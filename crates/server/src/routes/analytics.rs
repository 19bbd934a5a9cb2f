//! Sales reports.
//!
//! Receipts are loaded for the requested window and aggregated in memory.
//! Days are UTC calendar days; missing bounds default to the current month
//! or year.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Datelike;
use serde::Deserialize;
use tracing::instrument;

use shopdesk_core::{ShopId, YearMonth};

use crate::db::{ExpenseRepository, ReceiptRepository, ReceiptStore};
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{Receipt, ValidationError};
use crate::services::analytics::{
    self, DailyBucket, DateRange, MonthlyBucket, Summary, YearlyBucket,
};
use crate::state::AppState;

use super::DayRangeQuery;

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

fn current_month(state: &AppState) -> DateRange {
    DateRange::month(YearMonth::of(state.clock().now().date_naive()))
}

async fn receipts_in(
    state: &AppState,
    shop_id: ShopId,
    range: DateRange,
) -> Result<Vec<Receipt>, AppError> {
    let (from, to) = range.bounds();
    Ok(ReceiptRepository::new(state.pool())
        .list_receipts(shop_id, Some(from), Some(to))
        .await?)
}

/// GET /api/analytics/summary
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn summary(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<DayRangeQuery>,
) -> Result<Json<Summary>, AppError> {
    let range = query.or(current_month(&state))?;
    let receipts = receipts_in(&state, shop.shop_id, range).await?;
    let expenses = ExpenseRepository::new(state.pool())
        .list(shop.shop_id, Some(range.from), Some(range.to))
        .await?;
    Ok(Json(analytics::summarize(&receipts, &expenses, range)))
}

/// GET /api/analytics/daily
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn daily(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<DayRangeQuery>,
) -> Result<Json<Vec<DailyBucket>>, AppError> {
    let range = query.or(current_month(&state))?;
    // Rejects an oversized range before any query runs.
    analytics::daily(&[], range)?;
    let receipts = receipts_in(&state, shop.shop_id, range).await?;
    Ok(Json(analytics::daily(&receipts, range)?))
}

/// GET /api/analytics/monthly
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn monthly(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MonthlyBucket>>, AppError> {
    let year = query
        .year
        .unwrap_or_else(|| state.clock().now().year());
    let range = DateRange::year(year)
        .ok_or_else(|| ValidationError::new("year", "out of range"))?;
    let receipts = receipts_in(&state, shop.shop_id, range).await?;
    Ok(Json(analytics::monthly(&receipts, year)))
}

/// GET /api/analytics/yearly
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn yearly(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
) -> Result<Json<Vec<YearlyBucket>>, AppError> {
    let receipts = ReceiptRepository::new(state.pool())
        .list_receipts(shop.shop_id, None, None)
        .await?;
    Ok(Json(analytics::yearly(&receipts)))
}
