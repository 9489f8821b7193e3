// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `"YYYY-MM-DD"` workout day.
///
/// Returns `None` for anything that doesn't parse; callers skip such
/// records rather than erroring (malformed input is recoverable).
pub fn parse_day(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Format a workout day back to `"YYYY-MM-DD"`.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Extract the `"YYYY-MM"` month key from a `"YYYY-MM-DD"` day string.
pub fn month_key(date: &str) -> Option<String> {
    if date.len() >= 7 {
        Some(date[..7].to_string())
    } else {
        None
    }
}
