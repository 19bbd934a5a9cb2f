//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (table `shop.session`, created by
//! `shopdesk migrate`). The cookie is `HttpOnly`, `SameSite=Lax`, and `Secure`
//! whenever the public base URL is HTTPS.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ShopConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopdesk_session";

/// Schema holding the session table.
const SESSION_SCHEMA: &str = "shop";

/// Session table name.
const SESSION_TABLE: &str = "session";

/// Session expiry after inactivity (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session store could not be configured.
#[derive(Debug, Error)]
#[error("invalid session store name: {0}")]
pub struct SessionSetupError(String);

/// Build the `PostgreSQL` session store.
///
/// # Errors
///
/// Returns `SessionSetupError` if the schema or table name is rejected.
pub fn session_store(pool: &PgPool) -> Result<PostgresStore, SessionSetupError> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(|e| SessionSetupError(e.to_string()))?
        .with_table_name(SESSION_TABLE)
        .map_err(|e| SessionSetupError(e.to_string()))
}

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &ShopConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
