//! Adherence and history endpoints.
//!
//! - `GET /api/adherence?start=&end=` — one point per day, inclusive
//! - `GET /api/history` — logged doses, newest first
//! - `GET /api/history/adherence` — share taken among logged rows per date

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::adherence;
use crate::api::error::ApiError;
use crate::api::types::{parse_date, HistoryQuery, RangeQuery};
use crate::core_state::CoreState;
use crate::models::{AdherencePoint, HistoryEntry};

pub async fn range(
    State(core): State<Arc<CoreState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<AdherencePoint>>, ApiError> {
    let Query(query) = query?;
    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;
    let points = core.with_db(|conn| {
        adherence::percentage_for_range(conn, start, end).map_err(ApiError::from)
    })?;
    Ok(Json(points))
}

pub async fn history(
    State(core): State<Arc<CoreState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let entries = core.with_db(|conn| adherence::dose_history(conn, &filter).map_err(ApiError::from))?;
    Ok(Json(entries))
}

pub async fn logged(
    State(core): State<Arc<CoreState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<AdherencePoint>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let points = core.with_db(|conn| {
        adherence::logged_adherence_by_date(conn, &filter).map_err(ApiError::from)
    })?;
    Ok(Json(points))
}
