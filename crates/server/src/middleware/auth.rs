//! Authentication extractors.
//!
//! Every data route takes a [`RequireShop`] and scopes its queries by the
//! shop id found in the session.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentShop, session_keys};

/// Extractor that requires a signed-in shop.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireShop(shop): RequireShop) -> impl IntoResponse {
///     format!("Hello, {}!", shop.shop_name)
/// }
/// ```
pub struct RequireShop(pub CurrentShop);

/// Rejection when no shop is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session or no shop in it.
    Unauthorized,
    /// The session could not be read.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Sign in required" })),
            )
                .into_response(),
            Self::SessionUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireShop
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let shop: CurrentShop = session
            .get(session_keys::CURRENT_SHOP)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to read session");
                AuthRejection::SessionUnavailable
            })?
            .ok_or(AuthRejection::Unauthorized)?;

        Ok(Self(shop))
    }
}

/// Store the signed-in shop in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_shop(
    session: &Session,
    shop: &CurrentShop,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_SHOP, shop).await
}

/// Sign out: drop the whole session.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_shop(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentShop>(session_keys::CURRENT_SHOP).await?;
    session.flush().await
}
