pub mod dose_time;
pub mod enums;
pub mod log_entry;
pub mod medication;
pub mod schedule;

pub use dose_time::*;
pub use enums::*;
pub use log_entry::*;
pub use medication::*;
pub use schedule::*;

use chrono::{Datelike, NaiveDate};

use crate::error::TrackerError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for log timestamps (naive local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Years that keep the `YYYY-MM-DD` text form four digits wide, so stored
/// dates compare correctly as strings.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Parse a strict `YYYY-MM-DD` date: four-digit year, two-digit month and day.
pub fn parse_date(s: &str) -> Result<NaiveDate, TrackerError> {
    let raw = s.trim();
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return Err(TrackerError::validation(format!(
            "Invalid date (expected YYYY-MM-DD): {s}"
        )));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| TrackerError::validation(format!("Invalid date (expected YYYY-MM-DD): {s}")))
}

/// Rejects dates whose year falls outside `MIN_YEAR..=MAX_YEAR`.
pub fn ensure_storable_date(date: NaiveDate) -> Result<NaiveDate, TrackerError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(TrackerError::validation(format!(
            "Date {date} is outside years {MIN_YEAR:04}..={MAX_YEAR}"
        )))
    }
}

/// Serde adapter for optional dates that goes through `parse_date`.
pub mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_date(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
