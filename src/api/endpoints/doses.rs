use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::adherence;
use crate::api::error::ApiError;
use crate::api::types::{parse_date, parse_medication_id, RecordDoseRequest};
use crate::core_state::CoreState;
use crate::models::DoseTime;

/// `POST /api/doses` — mark a slot taken or not taken (upsert).
pub async fn record(
    State(core): State<Arc<CoreState>>,
    payload: Result<Json<RecordDoseRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    let med_id = parse_medication_id(&request.medication_id)?;
    let date = parse_date(&request.date)?;
    let time: DoseTime = request.time.parse()?;

    core.with_db(|conn| {
        adherence::record_dose(conn, &med_id, date, time, request.taken).map_err(ApiError::from)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
