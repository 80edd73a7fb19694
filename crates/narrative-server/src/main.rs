//! Meme narrative analysis server
//!
//! Axum server hosting one analysis session and the WASM frontend.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use narrative_core::{mock::MockProvider, AnalysisSession, AnalyzerBuilder, GenerationProvider};
use narrative_runtime::GeminiProvider;

use crate::handlers::{analyze_handler, current_analysis, health_check};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let provider = build_provider()?;
    let model = provider.info().model;

    let provider_configured = match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to {} ({})", provider.info().name, model);
            true
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Generation service not reachable - analyses will fail");
            tracing::warn!("  Check GEMINI_API_KEY and GEMINI_MODEL in .env");
            false
        }
    };

    let timeout_secs = std::env::var("ANALYSIS_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    let analyzer = AnalyzerBuilder::new()
        .provider(provider.clone())
        .model(model)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let state = AppState {
        provider,
        provider_configured,
        session: Arc::new(AnalysisSession::new(Arc::new(analyzer))),
    };

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());
    let app = router(state, &static_dir);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🐸 meme narrative agent running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health       - Health check");
    tracing::info!("  GET  /api/analysis - Current analysis state");
    tracing::info!("  POST /api/analyze  - Analyze {{name, contract_address}}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
fn router(state: AppState, static_dir: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analysis", get(current_analysis))
        .route("/api/analyze", post(analyze_handler))
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gemini unless `NARRATIVE_PROVIDER=mock`
fn build_provider() -> anyhow::Result<Arc<dyn GenerationProvider>> {
    if std::env::var("NARRATIVE_PROVIDER").is_ok_and(|p| p.eq_ignore_ascii_case("mock")) {
        tracing::warn!("⚠ Using mock provider - reports are canned");
        return Ok(Arc::new(MockProvider::demo()));
    }

    let provider = GeminiProvider::from_env().map_err(|e| {
        tracing::error!("Gemini not configured: {}", e);
        tracing::error!("  Set GEMINI_API_KEY in .env, or NARRATIVE_PROVIDER=mock for a demo");
        e
    })?;

    Ok(Arc::new(provider))
}
