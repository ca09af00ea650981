//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::PeriodParams;
use crate::{AppError, AppState};
use salesbook_core::SalesReport;

/// GET /api/report - Period summary and trend narrative
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<SalesReport>, AppError> {
    let query = params.resolve(&state.ledger)?;
    let report = state.ledger.report(&query)?;
    Ok(Json(report))
}
