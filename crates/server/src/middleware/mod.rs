//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on `/api/auth` (governor)

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{AuthRejection, RequireShop, clear_current_shop, set_current_shop};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use session::{SessionSetupError, create_session_layer, session_store};
