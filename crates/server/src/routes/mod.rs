//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database reachable)
//!
//! # Auth (rate limited)
//! POST /api/auth/signup                 - Register a shop
//! POST /api/auth/login                  - Sign in
//! POST /api/auth/logout                 - Sign out
//!
//! # Signed-in shop
//! GET|PUT        /api/me                - Profile
//! GET|POST       /api/stock             - Stock list (?category, ?low_stock) / create
//! GET|PUT|DELETE /api/stock/{id}
//! GET|POST       /api/receipts          - Receipts (?from, ?to) / record sale
//! GET|PUT|DELETE /api/receipts/{id}
//! POST           /api/receipts/{id}/returns
//! GET            /api/analytics/summary (?from, ?to)
//! GET            /api/analytics/daily   (?from, ?to)
//! GET            /api/analytics/monthly (?year)
//! GET            /api/analytics/yearly
//! GET|POST       /api/employees
//! GET|PUT|DELETE /api/employees/{id}
//! GET|POST       /api/employees/{id}/attendance (?month)
//! GET            /api/attendance        (?date)
//! GET            /api/salary            (?month)
//! GET|POST       /api/salary/payments   (?month)
//! GET|POST       /api/expenses          (?from, ?to)
//! PUT|DELETE     /api/expenses/{id}
//! ```

pub mod analytics;
pub mod auth;
pub mod expenses;
pub mod health;
pub mod profile;
pub mod receipts;
pub mod staff;
pub mod stock;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::{Days, NaiveDate, NaiveTime};
use serde::Deserialize;

use shopdesk_core::YearMonth;

use crate::middleware::auth_rate_limiter;
use crate::models::ValidationError;
use crate::services::analytics::DateRange;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the stock routes router.
pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stock::index).post(stock::create))
        .route(
            "/{id}",
            get(stock::show).put(stock::update).delete(stock::delete),
        )
}

/// Create the receipt routes router.
pub fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(receipts::index).post(receipts::create))
        .route(
            "/{id}",
            get(receipts::show)
                .put(receipts::update)
                .delete(receipts::delete),
        )
        .route("/{id}/returns", post(receipts::return_items))
}

/// Create the analytics routes router.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(analytics::summary))
        .route("/daily", get(analytics::daily))
        .route("/monthly", get(analytics::monthly))
        .route("/yearly", get(analytics::yearly))
}

/// Create the employee routes router.
pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(staff::index).post(staff::create))
        .route(
            "/{id}",
            get(staff::show).put(staff::update).delete(staff::delete),
        )
        .route(
            "/{id}/attendance",
            get(staff::attendance).post(staff::mark_attendance),
        )
}

/// Create the salary routes router.
pub fn salary_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(staff::salary))
        .route(
            "/payments",
            get(staff::payments).post(staff::record_payment),
        )
}

/// Create the expense routes router.
pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(expenses::index).post(expenses::create))
        .route("/{id}", axum::routing::put(expenses::update).delete(expenses::delete))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes())
        .route("/api/me", get(profile::show).put(profile::update))
        .nest("/api/stock", stock_routes())
        .nest("/api/receipts", receipt_routes())
        .nest("/api/analytics", analytics_routes())
        .nest("/api/employees", employee_routes())
        .route("/api/attendance", get(staff::attendance_by_date))
        .nest("/api/salary", salary_routes())
        .nest("/api/expenses", expense_routes())
}

/// Optional inclusive day range from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct DayRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DayRangeQuery {
    /// Reject `from` after `to` when both are given.
    pub fn check(&self) -> Result<(), ValidationError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            DateRange::new(from, to)?;
        }
        Ok(())
    }

    /// Both ends. A lone `from` runs to the end of its month and a lone `to`
    /// starts at the beginning of its month; `default` is used when neither
    /// is given.
    pub fn or(&self, default: DateRange) -> Result<DateRange, ValidationError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to),
            (Some(from), None) => DateRange::new(from, YearMonth::of(from).last_day()),
            (None, Some(to)) => DateRange::new(YearMonth::of(to).first_day(), to),
            (None, None) => Ok(default),
        }
    }

    /// Half-open timestamp bounds for receipt queries.
    pub fn timestamps(
        &self,
    ) -> (
        Option<chrono::DateTime<chrono::Utc>>,
        Option<chrono::DateTime<chrono::Utc>>,
    ) {
        let start = self.from.map(|d| d.and_time(NaiveTime::MIN).and_utc());
        let end = self.to.map(|d| {
            d.checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX)
                .and_time(NaiveTime::MIN)
                .and_utc()
        });
        (start, end)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_day_range_timestamps_are_half_open() {
        let query = DayRangeQuery {
            from: Some(date("2026-10-01")),
            to: Some(date("2026-10-31")),
        };
        let (start, end) = query.timestamps();
        assert_eq!(start.unwrap().to_rfc3339(), "2026-10-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2026-11-01T00:00:00+00:00");
    }

    #[test]
    fn test_day_range_rejects_reversed_bounds() {
        let query = DayRangeQuery {
            from: Some(date("2026-10-31")),
            to: Some(date("2026-10-01")),
        };
        assert!(query.check().is_err());
    }

    #[test]
    fn test_day_range_fills_missing_end() {
        let default = DateRange::month("2026-10".parse().unwrap());
        let query = DayRangeQuery {
            from: Some(date("2026-10-15")),
            to: None,
        };
        let range = query.or(default).unwrap();
        assert_eq!(range.from, date("2026-10-15"));
        assert_eq!(range.to, date("2026-10-31"));
    }

    #[test]
    fn test_day_range_lone_from_past_default_month_stays_in_its_own_month() {
        let default = DateRange::month("2026-10".parse().unwrap());
        let query = DayRangeQuery {
            from: Some(date("2026-12-05")),
            to: None,
        };
        let range = query.or(default).unwrap();
        assert_eq!(range.from, date("2026-12-05"));
        assert_eq!(range.to, date("2026-12-31"));
    }

    #[test]
    fn test_day_range_lone_to_starts_at_its_month() {
        let default = DateRange::month("2026-10".parse().unwrap());
        let query = DayRangeQuery {
            from: None,
            to: Some(date("2026-08-20")),
        };
        let range = query.or(default).unwrap();
        assert_eq!(range.from, date("2026-08-01"));
        assert_eq!(range.to, date("2026-08-20"));
    }

    #[test]
    fn test_day_range_without_bounds_uses_default() {
        let default = DateRange::month("2026-10".parse().unwrap());
        let range = DayRangeQuery::default().or(default).unwrap();
        assert_eq!(range, default);
    }
}
