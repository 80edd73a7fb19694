//! HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use narrative_core::{AnalysisRequest, SessionSnapshot, SubmitOutcome};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_configured: bool,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contract_address: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
///
/// Reports the provider status probed at startup; never calls the service.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let info = state.provider.info();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: info.name,
        provider_configured: state.provider_configured,
        model: state.session.analyzer().config().model.clone(),
    })
}

/// Current analysis state
pub async fn current_analysis(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot())
}

/// Submit an analysis and wait for it to settle
///
/// Incomplete submissions return the unchanged snapshot.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<SessionSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let request = AnalysisRequest::new(payload.name, payload.contract_address);
    let (outcome, snapshot) = state.session.submit_and_wait(request).await;

    match outcome {
        SubmitOutcome::Busy => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "An analysis is already running".into(),
                code: "ANALYSIS_IN_PROGRESS".into(),
            }),
        )),
        SubmitOutcome::Ignored | SubmitOutcome::Started(_) => Ok(Json(snapshot)),
    }
}
