//! Per-date schedule endpoints.
//!
//! - `GET /api/schedule/:date` — due slots with taken status
//! - `GET /api/schedule/:date/summary` — the same plus progress counters

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::adherence;
use crate::api::error::ApiError;
use crate::api::types::parse_date;
use crate::core_state::CoreState;
use crate::models::{DailySummary, ScheduleSlot};

pub async fn for_date(
    State(core): State<Arc<CoreState>>,
    date: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<ScheduleSlot>>, ApiError> {
    let Path(date) = date?;
    let date = parse_date(&date)?;
    let slots = core.with_db(|conn| adherence::status_for_date(conn, date).map_err(ApiError::from))?;
    Ok(Json(slots))
}

pub async fn summary(
    State(core): State<Arc<CoreState>>,
    date: Result<Path<String>, PathRejection>,
) -> Result<Json<DailySummary>, ApiError> {
    let Path(date) = date?;
    let date = parse_date(&date)?;
    let summary = core.with_db(|conn| adherence::daily_summary(conn, date).map_err(ApiError::from))?;
    Ok(Json(summary))
}
