//! Application State

use std::sync::Arc;

use narrative_core::{AnalysisSession, GenerationProvider};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Generation backend (Gemini, or the mock in demo mode)
    pub provider: Arc<dyn GenerationProvider>,

    /// Result of the startup health check, reported by `/health`
    pub provider_configured: bool,

    /// The single analysis session this server hosts
    pub session: Arc<AnalysisSession>,
}
