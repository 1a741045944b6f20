//! Device-local calendar arithmetic used by streaks and weekly goals.
//!
//! All dates here are naive: the host passes local wall-clock time, and a
//! "day" is whatever the device calendar says it is.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};

use crate::error::{HookyError, Result};

/// Most recent Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Inclusive last day of the week that starts on `start`.
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start + Duration::days(6)
}

pub fn is_day_before(earlier: NaiveDate, later: NaiveDate) -> bool {
    later.pred_opt() == Some(earlier)
}

/// Current local time, unless the request pinned one with `now=`.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS` (optionally with fractional seconds) and a
/// bare `YYYY-MM-DD`, which means midnight.
pub fn resolve_now(param: Option<&str>) -> Result<NaiveDateTime> {
    match param.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Local::now().naive_local()),
        Some(raw) => parse_local(raw),
    }
}

fn parse_local(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| HookyError::invalid(format!("invalid now parameter: {}", raw)))
}
