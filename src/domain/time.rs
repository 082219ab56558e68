//! Strict UTC timestamp handling.
//!
//! Every timestamp crossing the API boundary must be ISO 8601 UTC with a
//! literal `Z` suffix; offset forms and date-only strings are rejected.
//! Stored timestamps are formatted at fixed millisecond width so TEXT
//! comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::errors::{DomainError, DomainResult};

/// Parse a strict ISO 8601 UTC timestamp (`2026-01-16T05:59:59.999Z`).
///
/// Accepts an optional fractional-seconds part of 1 to 3 digits. Anything
/// else, including offset forms (`+00:00`) and date-only strings, fails
/// with [`DomainError::ValidationFailed`].
pub fn parse_utc(raw: &str) -> DomainResult<DateTime<Utc>> {
    if !has_utc_shape(raw) {
        return Err(DomainError::ValidationFailed(format!(
            "date must be ISO 8601 UTC ending in 'Z' (e.g. 2026-01-16T05:59:59.999Z), got: {raw}"
        )));
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| DomainError::ValidationFailed(format!("invalid date {raw}: {e}")))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Format as fixed-width ISO 8601 UTC with millisecond precision.
pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format as a UTC day bucket (`YYYY-MM-DD`). Used for chart grouping only,
/// never for range queries.
pub fn format_utc_day(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Shape check: `YYYY-MM-DDThh:mm:ss[.f{1,3}]Z`. Seconds are mandatory.
fn has_utc_shape(raw: &str) -> bool {
    const DIGITS: [usize; 14] = [0, 1, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18];

    let bytes = raw.as_bytes();
    if bytes.len() < 20 || bytes[bytes.len() - 1] != b'Z' {
        return false;
    }
    if !DIGITS.iter().all(|&i| bytes[i].is_ascii_digit()) {
        return false;
    }
    if bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'T' || bytes[13] != b':' || bytes[16] != b':' {
        return false;
    }
    let frac = &bytes[19..bytes.len() - 1];
    if frac.is_empty() {
        return true;
    }
    frac[0] == b'.' && (1..=3).contains(&(frac.len() - 1)) && frac[1..].iter().all(u8::is_ascii_digit)
}
