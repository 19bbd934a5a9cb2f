//! Sign-up, sign-in and sign-out.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use shopdesk_core::AccountStatus;

use crate::db::AccountRepository;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_shop, set_current_shop};
use crate::models::{CurrentShop, ShopAccount};
use crate::services::{AuthService, SignUp};
use crate::state::AppState;

/// Sign-up form.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub shop_name: String,
    pub owner_name: String,
}

/// Sign-in form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned after sign-up and sign-in.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account: ShopAccount,
    /// Whether a session was started. False while an account awaits approval.
    pub signed_in: bool,
}

pub(crate) fn auth_service<'a>(
    state: &'a AppState,
    accounts: &'a AccountRepository<'a>,
) -> AuthService<'a, AccountRepository<'a>> {
    let settings = state.config().auth;
    AuthService::new(accounts, state.clock(), settings.lockout)
        .require_approval(settings.require_approval)
}

async fn start_session(session: &Session, account: &ShopAccount) -> Result<(), AppError> {
    set_current_shop(session, &CurrentShop::from(account)).await?;
    set_sentry_user(account.id, Some(account.email.as_str()));
    Ok(())
}

/// Register a shop.
///
/// POST /api/auth/signup
///
/// Active accounts are signed in straight away.
#[instrument(skip_all, fields(email = %req.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let accounts = AccountRepository::new(state.pool());
    let account = auth_service(&state, &accounts)
        .sign_up(SignUp {
            email: &req.email,
            password: &req.password,
            shop_name: &req.shop_name,
            owner_name: &req.owner_name,
        })
        .await?;

    let signed_in = account.account_status == AccountStatus::Active;
    if signed_in {
        start_session(&session, &account).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse { account, signed_in }),
    ))
}

/// Sign in.
///
/// POST /api/auth/login
#[instrument(skip_all, fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let accounts = AccountRepository::new(state.pool());
    let account = auth_service(&state, &accounts)
        .sign_in(&req.email, &req.password)
        .await?;

    start_session(&session, &account).await?;

    Ok(Json(SessionResponse {
        account,
        signed_in: true,
    }))
}

/// Sign out.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    clear_current_shop(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
