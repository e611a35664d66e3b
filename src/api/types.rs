//! Request and response bodies for the HTTP layer.
//!
//! Dates and ids arrive as strings so malformed values surface as
//! validation errors rather than extractor rejections.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::models::{self, Frequency, HistoryFilter, NewMedication};

#[derive(Debug, Deserialize)]
pub struct AddMedicationRequest {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: Frequency,
    pub times: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AddMedicationRequest {
    pub fn into_new_medication(self) -> Result<NewMedication, ApiError> {
        Ok(NewMedication {
            name: self.name,
            dosage: self.dosage,
            frequency: self.frequency,
            times: self.times,
            start_date: parse_optional_date(self.start_date.as_deref())?,
            end_date: parse_optional_date(self.end_date.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AddMedicationResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RecordDoseRequest {
    pub medication_id: String,
    pub date: String,
    pub time: String,
    pub taken: bool,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub medication_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl HistoryQuery {
    pub fn into_filter(self) -> Result<HistoryFilter, ApiError> {
        Ok(HistoryFilter {
            medication_id: self.medication_id.as_deref().map(parse_medication_id).transpose()?,
            date_from: parse_optional_date(self.date_from.as_deref())?,
            date_to: parse_optional_date(self.date_to.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
}

pub fn parse_medication_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid medication id: {raw}")))
}

pub fn parse_date(raw: &str) -> Result<chrono::NaiveDate, ApiError> {
    Ok(models::parse_date(raw)?)
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, ApiError> {
    match raw {
        Some(s) if !s.trim().is_empty() => parse_date(s).map(Some),
        _ => Ok(None),
    }
}
