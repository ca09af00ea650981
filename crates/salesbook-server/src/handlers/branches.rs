//! Branch and health handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use salesbook_core::BranchCode;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app_id: String,
    pub records: i64,
}

/// GET /api/health - Liveness and record count
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let records = state.ledger.store().count_sales_records()?;
    Ok(Json(HealthResponse {
        status: "ok",
        app_id: state.ledger.config().app_id.clone(),
        records,
    }))
}

/// GET /api/branches - Configured branch codes
pub async fn list_branches(State(state): State<Arc<AppState>>) -> Json<Vec<BranchCode>> {
    Json(state.ledger.branches().to_vec())
}
