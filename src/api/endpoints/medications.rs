//! Medication endpoints.
//!
//! - `GET /api/medications` — all definitions
//! - `POST /api/medications` — register a medication
//! - `DELETE /api/medications/:id` — remove it and its dose log
//! - `GET /api/time-options` — selectable half-hour times

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_medication_id, AddMedicationRequest, AddMedicationResponse};
use crate::core_state::CoreState;
use crate::models::{DoseTime, Medication};
use crate::registry;

pub async fn list(State(core): State<Arc<CoreState>>) -> Result<Json<Vec<Medication>>, ApiError> {
    let meds = core.with_db(|conn| registry::list_medications(conn).map_err(ApiError::from))?;
    Ok(Json(meds))
}

pub async fn add(
    State(core): State<Arc<CoreState>>,
    payload: Result<Json<AddMedicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddMedicationResponse>), ApiError> {
    let Json(request) = payload?;
    let input = request.into_new_medication()?;
    let med = core.with_db(|conn| registry::add_medication(conn, &input).map_err(ApiError::from))?;
    Ok((StatusCode::CREATED, Json(AddMedicationResponse { id: med.id })))
}

pub async fn remove(
    State(core): State<Arc<CoreState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let med_id = parse_medication_id(&id)?;
    core.with_db(|conn| registry::delete_medication(conn, &med_id).map_err(ApiError::from))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn time_options() -> Json<Vec<DoseTime>> {
    Json(DoseTime::grid())
}
