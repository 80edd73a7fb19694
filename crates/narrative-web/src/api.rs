//! API Client

use serde::{Deserialize, Serialize};

/// Shown for any failure; the server never exposes technical detail either.
pub const FAILURE_MESSAGE: &str = "Analysis failed. Please check the API key or try again later.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub markdown: String,
    pub sources: Vec<GroundingSource>,
}

/// Session state as returned by the server
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: AnalysisState,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub error: Option<String>,
}

fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

/// Submit an analysis and wait for the settled snapshot
pub async fn analyze(name: &str, contract_address: &str) -> Result<SessionSnapshot, String> {
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "name": name,
        "contract_address": contract_address,
    });

    let response = client
        .post(format!("{}/api/analyze", origin()))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        Err(data["error"].as_str().unwrap_or("Request failed").to_string())
    }
}
