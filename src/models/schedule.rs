//! Derived views. Nothing here is persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dose_time::DoseTime;

/// One due dose on a given date and whether it has been taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub time: DoseTime,
    pub taken: bool,
}

/// Share of a date's due slots marked taken, 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherencePoint {
    pub date: NaiveDate,
    pub percentage: f64,
}

/// Schedule for one date plus its progress counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub slots: Vec<ScheduleSlot>,
    pub taken_count: usize,
    pub due_count: usize,
    pub percentage: f64,
}

/// A logged dose joined with its medication's labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub date: NaiveDate,
    pub time: DoseTime,
    pub taken: bool,
    pub timestamp: NaiveDateTime,
}

/// Dose history filter. All bounds inclusive; `None` means unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub medication_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
