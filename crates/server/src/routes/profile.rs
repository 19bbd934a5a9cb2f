//! The signed-in shop's profile.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::AccountRepository;
use crate::error::AppError;
use crate::middleware::RequireShop;
use crate::models::{CurrentShop, ProfileUpdate, ShopAccount, session_keys};
use crate::state::AppState;

use super::auth::auth_service;

/// GET /api/me
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireShop(shop): RequireShop,
) -> Result<Json<ShopAccount>, AppError> {
    let accounts = AccountRepository::new(state.pool());
    let account = auth_service(&state, &accounts).profile(shop.shop_id).await?;
    Ok(Json(account))
}

/// PUT /api/me
///
/// A renamed shop is written back to the session so later responses agree.
#[instrument(skip_all, fields(shop_id = %shop.shop_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireShop(shop): RequireShop,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ShopAccount>, AppError> {
    let accounts = AccountRepository::new(state.pool());
    let account = auth_service(&state, &accounts)
        .update_profile(shop.shop_id, &update)
        .await?;

    if account.shop_name != shop.shop_name {
        session
            .insert(session_keys::CURRENT_SHOP, CurrentShop::from(&account))
            .await?;
    }

    Ok(Json(account))
}
