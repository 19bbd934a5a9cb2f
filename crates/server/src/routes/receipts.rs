//! Receipt routes.
//!
//! Writes return the receipt together with the stock reconciliation report so
//! the client can show which lines did not move stock.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use shopdesk_core::ReceiptId;

use crate::db::{ReceiptRepository, StockRepository};
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{Receipt, ReceiptInput, ReturnLine};
use crate::services::{ReceiptOutcome, ReceiptService};
use crate::state::AppState;

use super::DayRangeQuery;

/// Items handed back by the customer.
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub items: Vec<ReturnLine>,
}

/// GET /api/receipts
///
/// Newest first. `from` and `to` are inclusive days (UTC).
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(range): Query<DayRangeQuery>,
) -> Result<Json<Vec<Receipt>>, AppError> {
    range.check()?;
    let (from, to) = range.timestamps();
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let list = ReceiptService::new(&receipts, &stock, state.clock())
        .list(shop.shop_id, from, to)
        .await?;
    Ok(Json(list))
}

/// POST /api/receipts
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Json(input): Json<ReceiptInput>,
) -> Result<(StatusCode, Json<ReceiptOutcome>), AppError> {
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let outcome = ReceiptService::new(&receipts, &stock, state.clock())
        .create(shop.shop_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/receipts/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, receipt_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ReceiptId>,
) -> Result<Json<Receipt>, AppError> {
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let receipt = ReceiptService::new(&receipts, &stock, state.clock())
        .get(shop.shop_id, id)
        .await?;
    Ok(Json(receipt))
}

/// PUT /api/receipts/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, receipt_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ReceiptId>,
    Json(input): Json<ReceiptInput>,
) -> Result<Json<ReceiptOutcome>, AppError> {
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let outcome = ReceiptService::new(&receipts, &stock, state.clock())
        .update(shop.shop_id, id, input)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/receipts/{id}/returns
#[instrument(skip_all, fields(shop_id = %shop.shop_id, receipt_id = %id))]
pub async fn return_items(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ReceiptId>,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<ReceiptOutcome>, AppError> {
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let outcome = ReceiptService::new(&receipts, &stock, state.clock())
        .return_items(shop.shop_id, id, &req.items)
        .await?;
    Ok(Json(outcome))
}

/// DELETE /api/receipts/{id}
///
/// Responds with the deleted receipt and the restock report.
#[instrument(skip_all, fields(shop_id = %shop.shop_id, receipt_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<ReceiptId>,
) -> Result<Json<ReceiptOutcome>, AppError> {
    let receipts = ReceiptRepository::new(state.pool());
    let stock = StockRepository::new(state.pool());
    let outcome = ReceiptService::new(&receipts, &stock, state.clock())
        .delete(shop.shop_id, id)
        .await?;
    Ok(Json(outcome))
}
