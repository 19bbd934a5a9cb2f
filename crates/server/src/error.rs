//! Unified error handling for the JSON API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use shopdesk_core::{AccountStatus, ShopId};

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AuthError, ReceiptError};

/// Application-level error type for API handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Shop is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Sign-in refused. `remaining_attempts` is set for a known account.
    #[error("Invalid email or password")]
    InvalidCredentials { remaining_attempts: Option<i32> },

    /// Too many failed sign-ins.
    #[error("Account locked until {until}")]
    Locked { until: DateTime<Utc> },

    /// Account blocked by an operator or awaiting approval.
    #[error("{}", AuthError::status_message(*.0))]
    AccountUnavailable(AccountStatus),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A submitted field was rejected.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Duplicate resource.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for every error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_attempts: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locked_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_status: Option<AccountStatus>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized(_) | Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::Locked { .. } => StatusCode::LOCKED,
            Self::AccountUnavailable(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            field: None,
            remaining_attempts: None,
            locked_until: None,
            account_status: None,
        };
        match self {
            Self::Database(RepositoryError::Conflict(message)) => {
                body.error.clone_from(message);
            }
            Self::Database(RepositoryError::NotFound) => body.error = "Not found".to_string(),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                body.error = "Internal server error".to_string();
            }
            Self::Validation(e) => body.field = Some(e.field),
            Self::InvalidCredentials { remaining_attempts } => {
                body.remaining_attempts = *remaining_attempts;
            }
            Self::Locked { until } => body.locked_until = Some(*until),
            Self::AccountUnavailable(status) => body.account_status = Some(*status),
            _ => {}
        }
        body
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::BadRequest(format!("invalid email: {e}")),
            AuthError::InvalidCredentials => Self::InvalidCredentials {
                remaining_attempts: None,
            },
            AuthError::WrongPassword { remaining_attempts } => Self::InvalidCredentials {
                remaining_attempts: Some(remaining_attempts),
            },
            AuthError::AccountLocked { until } => Self::Locked { until },
            AuthError::AccountUnavailable(status) => Self::AccountUnavailable(status),
            AuthError::AccountNotFound => Self::NotFound("account".to_string()),
            AuthError::AccountAlreadyExists => {
                Self::Conflict("an account with this email already exists".to_string())
            }
            AuthError::WeakPassword(message) => Self::BadRequest(message),
            AuthError::Validation(e) => Self::Validation(e),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}

impl From<ReceiptError> for AppError {
    fn from(err: ReceiptError) -> Self {
        match err {
            ReceiptError::Validation(e) => Self::Validation(e),
            ReceiptError::NotFound => Self::NotFound("receipt".to_string()),
            ReceiptError::Repository(e) => Self::Database(e),
        }
    }
}

/// Set the Sentry user context from the signed-in shop.
pub fn set_sentry_user(shop_id: ShopId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(shop_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("receipt".to_string());
        assert_eq!(err.to_string(), "Not found: receipt");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::AccountUnavailable(AccountStatus::Frozen)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("dup".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, json) = body_json(AppError::Database(RepositoryError::DataCorruption(
            "bad status 'x'".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_wrong_password_reports_remaining_attempts() {
        let (status, json) = body_json(AppError::from(AuthError::WrongPassword {
            remaining_attempts: 3,
        }))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["remaining_attempts"], 3);
        assert!(json.get("locked_until").is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_has_no_attempt_count() {
        let (status, json) = body_json(AppError::from(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json.get("remaining_attempts").is_none());
    }

    #[tokio::test]
    async fn test_locked_account_reports_until() {
        let until = "2026-10-17T12:15:00Z".parse().unwrap();
        let (status, json) = body_json(AppError::from(AuthError::AccountLocked { until })).await;
        assert_eq!(status, StatusCode::LOCKED);
        assert_eq!(json["locked_until"], "2026-10-17T12:15:00Z");
    }

    #[tokio::test]
    async fn test_unavailable_account_uses_status_message() {
        let (_, json) = body_json(AppError::AccountUnavailable(AccountStatus::Pending)).await;
        assert_eq!(json["error"], "Your account is awaiting approval.");
        assert_eq!(json["account_status"], "pending");
    }

    #[tokio::test]
    async fn test_validation_names_the_field() {
        let err = ReceiptError::Validation(ValidationError::new("items", "must not be empty"));
        let (status, json) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["field"], "items");
    }
}
