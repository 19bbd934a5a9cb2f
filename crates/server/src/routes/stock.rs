//! Stock item routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use shopdesk_core::StockItemId;

use crate::db::{StockRepository, StockStore};
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{StockItem, StockItemInput};
use crate::state::AppState;

/// Filters for the stock list.
#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    pub category: Option<String>,
    /// Only items at or below the low-stock threshold.
    #[serde(default)]
    pub low_stock: bool,
}

/// A stock item with its low-stock flag.
#[derive(Debug, Serialize)]
pub struct StockEntry {
    #[serde(flatten)]
    pub item: StockItem,
    pub low_stock: bool,
}

/// GET /api/stock
///
/// A failed lookup is logged and answered with an empty list.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Query(query): Query<StockQuery>,
) -> Json<Vec<StockEntry>> {
    let threshold = state.config().low_stock_threshold;
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let items = match StockRepository::new(state.pool())
        .list_stock(shop.shop_id, category)
        .await
    {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "failed to load stock, returning empty list");
            Vec::new()
        }
    };

    let entries = items
        .into_iter()
        .map(|item| StockEntry {
            low_stock: item.is_low(threshold),
            item,
        })
        .filter(|entry| !query.low_stock || entry.low_stock)
        .collect();

    Json(entries)
}

/// POST /api/stock
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Json(input): Json<StockItemInput>,
) -> Result<(StatusCode, Json<StockItem>), AppError> {
    let input = input.validated()?;
    let item = StockRepository::new(state.pool())
        .create_stock(shop.shop_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/stock/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, stock_item_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<StockItemId>,
) -> Result<Json<StockItem>, AppError> {
    StockRepository::new(state.pool())
        .get_stock(shop.shop_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("stock item".to_string()))
}

/// PUT /api/stock/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, stock_item_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<StockItemId>,
    Json(input): Json<StockItemInput>,
) -> Result<Json<StockItem>, AppError> {
    let input = input.validated()?;
    let item = StockRepository::new(state.pool())
        .update_stock(shop.shop_id, id, &input)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/stock/{id}
#[instrument(skip_all, fields(shop_id = %shop.shop_id, stock_item_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
    Path(id): Path<StockItemId>,
) -> Result<StatusCode, AppError> {
    if StockRepository::new(state.pool())
        .delete_stock(shop.shop_id, id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("stock item".to_string()))
    }
}
