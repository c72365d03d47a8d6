//! Date/time columns derived from the metadata creation timestamp.
//!
//! Every snapshot row carries three derived columns:
//!
//! - `Date`: `YYYY.MM.DD`
//! - `Time`: `HH:MM:SS`
//! - `DateTime`: `YYYY-MM-DDTHH:MM:SS` (local wall-clock time, no offset)
//!
//! Timestamps that cannot be parsed map to a fixed sentinel so one bad row
//! never aborts a batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::value::Cell;

pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";
pub const DATE_TIME_COLUMN: &str = "DateTime";

/// The derived columns in the order they are appended.
pub const TEMPORAL_COLUMNS: [&str; 3] = [DATE_COLUMN, TIME_COLUMN, DATE_TIME_COLUMN];

pub const SENTINEL_DATE: &str = "1900.01.01";
pub const SENTINEL_TIME: &str = "00:00:00";
pub const SENTINEL_DATE_TIME: &str = "1900-01-01T00:00:00";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parses a creation timestamp into a naive local date-time.
///
/// Timestamps with an explicit offset keep their wall-clock time.
pub fn parse_creation_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// The `Date`, `Time`, and `DateTime` values of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalColumns {
    pub date: String,
    pub time: String,
    pub date_time: String,
}

impl TemporalColumns {
    pub fn from_date_time(value: NaiveDateTime) -> Self {
        Self {
            date: value.format("%Y.%m.%d").to_string(),
            time: value.format("%H:%M:%S").to_string(),
            date_time: value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Derives the columns from a timestamp cell; `None` if it does not parse.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        cell.as_text()
            .and_then(parse_creation_timestamp)
            .map(Self::from_date_time)
    }

    /// Values used when the timestamp is missing or malformed.
    pub fn sentinel() -> Self {
        Self {
            date: SENTINEL_DATE.to_string(),
            time: SENTINEL_TIME.to_string(),
            date_time: SENTINEL_DATE_TIME.to_string(),
        }
    }

    pub fn into_cells(self) -> [Cell; 3] {
        [
            Cell::Text(self.date),
            Cell::Text(self.time),
            Cell::Text(self.date_time),
        ]
    }
}
