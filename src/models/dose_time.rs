//! Time-of-day for a scheduled dose.
//!
//! Always `HH:MM` (24h, zero-padded) and always on the half-hour grid the
//! schedule picker offers. Ordering follows the clock, which matches the
//! lexical order of the wire form.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TrackerError;

/// Spacing of selectable dose times, in minutes.
pub const GRID_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoseTime(NaiveTime);

impl DoseTime {
    /// Build from hour and minute; `None` when invalid or off the grid.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if minute % GRID_MINUTES != 0 {
            return None;
        }
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Every selectable time of day, `00:00` through `23:30`.
    pub fn grid() -> Vec<DoseTime> {
        (0..24)
            .flat_map(|hour| (0..60).step_by(GRID_MINUTES as usize).map(move |minute| (hour, minute)))
            .filter_map(|(hour, minute)| Self::new(hour, minute))
            .collect()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for DoseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for DoseTime {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
        if !well_formed {
            return Err(TrackerError::validation(format!(
                "Invalid time (expected HH:MM): {s}"
            )));
        }

        let hour: u32 = s[..2]
            .parse()
            .map_err(|_| TrackerError::validation(format!("Invalid hour: {s}")))?;
        let minute: u32 = s[3..]
            .parse()
            .map_err(|_| TrackerError::validation(format!("Invalid minute: {s}")))?;

        if hour > 23 || minute > 59 {
            return Err(TrackerError::validation(format!("Time out of range: {s}")));
        }
        Self::new(hour, minute).ok_or_else(|| {
            TrackerError::validation(format!(
                "Time must fall on a {GRID_MINUTES}-minute boundary: {s}"
            ))
        })
    }
}

impl Serialize for DoseTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DoseTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
