//! Daily sales record handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::PeriodParams;
use crate::{AppError, AppState, MAX_BODY_SIZE};
use salesbook_core::export::parse_date;
use salesbook_core::{RawSalesInput, SalesRecord};

/// Request body for submitting a day's sales
///
/// Numeric fields sit at the top level next to `branch` and `date`, in
/// snake_case or camelCase. Missing or non-numeric values read as 0.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub branch: String,
    pub date: String,
    #[serde(flatten)]
    pub raw: RawSalesInput,
}

/// GET /api/records - Records for a month, ascending by date
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<Vec<SalesRecord>>, AppError> {
    let query = params.resolve(&state.ledger)?;
    let records = state.ledger.records(&query)?;
    Ok(Json(records))
}

/// POST /api/records - Create or replace a day's record
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SalesRecord>), AppError> {
    if body.len() > MAX_BODY_SIZE {
        return Err(AppError::bad_request("Request body too large"));
    }
    let req: CreateRecordRequest =
        serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let date = parse_date(&req.date)?;
    let record = state.ledger.submit(&req.branch, date, &req.raw)?;

    info!(key = %record.key(), "Record submitted via API");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/records/:branch/:date - One branch's record for a day
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((branch, date)): Path<(String, String)>,
) -> Result<Json<SalesRecord>, AppError> {
    let date = parse_date(&date)?;
    let record = state.ledger.record(&branch, date)?;
    Ok(Json(record))
}
