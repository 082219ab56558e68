//! Strict query-parameter parsing.
//!
//! Date-bearing parameters must be full ISO 8601 UTC strings ending in
//! `Z`; anything else is a 400 naming the offending parameter. Required
//! parameters 400 when absent instead of silently defaulting.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::StatsWindow;
use crate::domain::time;

use super::error::ApiError;

/// Require a query parameter to be present.
pub fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("missing required query parameter: {name}")))
}

/// Parse a strict UTC timestamp, naming the parameter on failure.
pub fn parse_date(name: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    time::parse_utc(raw).map_err(|_| {
        ApiError::validation(format!(
            "{name} must be an ISO 8601 UTC timestamp ending in 'Z', got: {raw}"
        ))
    })
}

/// Require and parse a strict UTC timestamp parameter.
pub fn required_date(name: &str, value: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    parse_date(name, required(name, value)?)
}

/// Require and parse a UUID parameter.
pub fn required_uuid(name: &str, value: Option<&str>) -> Result<Uuid, ApiError> {
    let raw = required(name, value)?;
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::validation(format!("{name} must be a UUID, got: {raw}")))
}

/// Build an inclusive stats window, rejecting inverted ranges.
pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<StatsWindow, ApiError> {
    StatsWindow::new(start, end).map_err(ApiError::validation)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_required_names_the_missing_parameter() {
        let err = required("startDate", None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("startDate"));

        assert_eq!(required("startDate", Some("x")).unwrap(), "x");
    }

    #[test]
    fn test_parse_date_accepts_strict_utc_only() {
        let parsed = parse_date("startDate", "2024-01-15T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        for raw in ["2024-01-15", "2024-01-15T00:00:00", "2024-01-15T00:00:00+00:00"] {
            let err = parse_date("endDate", raw).unwrap_err();
            assert_eq!(err.code, "VALIDATION_FAILED");
            assert!(err.message.contains("endDate"), "message should name the parameter");
        }
    }

    #[test]
    fn test_required_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(required_uuid("unitId", Some(&id.to_string())).unwrap(), id);

        let err = required_uuid("unitId", Some("not-a-uuid")).unwrap_err();
        assert!(err.message.contains("unitId"));
        assert!(required_uuid("unitId", None).is_err());
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let err = window(start, end).unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");

        assert!(window(end, start).is_ok());
    }
}
