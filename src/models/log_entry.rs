use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dose_time::DoseTime;

/// Taken/not-taken record for one (medication, date, time) slot.
/// At most one exists per slot; later writes overwrite `taken`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub medication_id: Uuid,
    pub date: NaiveDate,
    pub time: DoseTime,
    pub taken: bool,
    /// Last write; informational only.
    pub timestamp: NaiveDateTime,
}
