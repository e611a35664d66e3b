//! Repository layer — entity-scoped database operations.
//!
//! The only place that knows the SQL schema and the stored string forms of
//! dates, times and the JSON-encoded `times` list. Everything above this
//! layer works with typed records.

mod dose_log;
mod medication;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{DoseTime, DATE_FORMAT, TIMESTAMP_FORMAT};

pub use dose_log::*;
pub use medication::*;

fn parse_uuid_column(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(format!("bad id {raw:?}: {e}")))
}

fn parse_date_column(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date {raw:?}: {e}")))
}

fn parse_time_column(raw: &str) -> Result<DoseTime, DatabaseError> {
    raw.parse::<DoseTime>()
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn parse_timestamp_column(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
