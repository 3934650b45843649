//! Triage API handlers
//!
//! POST /api/triage, POST /api/assess, GET /api/vehicles/:number
//!
//! The workflow is synchronous (and may block on the notification webhook),
//! so handlers run it on the blocking pool.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::CaseInput;
use crate::registry::{normalize_vehicle_number, VehicleRecord};
use crate::services::{AssessRequest, AssessedTriage};
use crate::workflow::TriageOutcome;
use crate::AppState;

/// GET /api/vehicles/:number response
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub vehicle_number: String,
    #[serde(flatten)]
    pub record: VehicleRecord,
}

/// POST /api/triage
///
/// Run a case through the workflow. Always 200 with an outcome.
pub async fn triage_case(
    State(state): State<AppState>,
    Json(input): Json<CaseInput>,
) -> ApiResult<Json<TriageOutcome>> {
    let crash_assist = state.crash_assist.clone();
    let outcome = tokio::task::spawn_blocking(move || crash_assist.triage(input)).await?;

    tracing::info!(
        case_id = %outcome.case_id,
        branch = ?outcome.branch,
        "Case triaged"
    );

    Ok(Json(outcome))
}

/// POST /api/assess
///
/// Assess a photo against the reference image, then triage the resulting case.
pub async fn assess_case(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> ApiResult<Json<AssessedTriage>> {
    let crash_assist = state.crash_assist.clone();
    let result = tokio::task::spawn_blocking(move || crash_assist.assess_and_triage(request)).await?;

    match result {
        Ok(triaged) => Ok(Json(triaged)),
        Err(e) => {
            tracing::warn!(error = %e, "Assessment request rejected");
            *state.last_error.write().await = Some(e.to_string());
            Err(ApiError::from(e))
        }
    }
}

/// GET /api/vehicles/:number
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Json<VehicleResponse>> {
    let normalized = normalize_vehicle_number(&number);
    let record = state
        .crash_assist
        .workflow()
        .registry()
        .lookup(&normalized)
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle not registered: {}", normalized)))?;

    Ok(Json(VehicleResponse {
        vehicle_number: normalized,
        record,
    }))
}

/// Build triage routes
pub fn triage_routes() -> Router<AppState> {
    Router::new()
        .route("/api/triage", post(triage_case))
        .route("/api/assess", post(assess_case))
        .route("/api/vehicles/:number", get(get_vehicle))
}
