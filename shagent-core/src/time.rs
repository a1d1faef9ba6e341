//! Time utilities: wall-clock day bounds and timezone conversion.
//!
//! The scheduler works on local wall-clock `NaiveDateTime`s so that energy
//! lookups by "HH:00" line up with the user's day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, Result};

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| CoreError::invalid(format!("invalid timezone: {tz}")))
}

/// Parse a clock time like "09:00" or "17:30".
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| CoreError::invalid(format!("invalid time '{s}' (expected HH:MM): {e}")))
}

/// Resolve "HH:MM" day bounds on `day` into wall-clock instants.
pub fn day_bounds(day: NaiveDate, start: &str, end: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let start = day.and_time(parse_clock(start)?);
    let end = day.and_time(parse_clock(end)?);
    if end < start {
        return Err(CoreError::invalid(format!(
            "day end {} is before day start {}",
            end.format("%H:%M"),
            start.format("%H:%M")
        )));
    }
    Ok((start, end))
}

/// Convert a UTC instant to wall-clock time in `tz`.
pub fn to_local(dt: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    dt.with_timezone(&tz).naive_local()
}

/// Format an instant as the energy-curve key of its hour ("HH:00").
pub fn hour_label(dt: NaiveDateTime) -> String {
    dt.format("%H:00").to_string()
}
