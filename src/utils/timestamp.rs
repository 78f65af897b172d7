//! Timestamps for log lines, file names and records.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Current local time as `YYYY-MM-DD HH:MM:SS.mmm`.
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS.mmm` (ISO 8601 with the `T`
/// replaced by a space and no trailing `Z`).
pub fn utc_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Formats any zoned time as `YYYY-MM-DD HH:MM:SS.mmm` in its own zone.
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local month and year, e.g. `January_2025`.
pub fn current_month_year() -> String {
    month_year(&Local::now())
}

/// Month name and year of `time`, joined by an underscore.
pub fn month_year<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    let month = chrono::Month::try_from(time.month() as u8)
        .map(|m| m.name())
        .unwrap_or("Unknown");
    format!("{}_{}", month, time.year())
}
