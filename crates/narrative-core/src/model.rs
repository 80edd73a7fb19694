//! Analysis Data Model
//!
//! Request and result types shared by the analyzer, the session state
//! machine and the presentation layer.

use serde::{Deserialize, Serialize};

/// A single user submission: display name plus contract address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Asset display name (e.g. "PEPE")
    pub name: String,

    /// On-chain contract address (CA)
    pub contract_address: String,
}

impl AnalysisRequest {
    pub fn new(name: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contract_address: contract_address.into(),
        }
    }

    /// Both fields carry something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.contract_address.trim().is_empty()
    }
}

/// A citation link attached to the generated report.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

impl GroundingSource {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Markdown report plus its deduplicated sources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Report body as markdown
    pub markdown: String,

    /// Citations, unique by uri, in first-seen order
    pub sources: Vec<GroundingSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_completeness() {
        assert!(AnalysisRequest::new("PEPE", "0xabc").is_complete());
        assert!(!AnalysisRequest::new("", "0xabc").is_complete());
        assert!(!AnalysisRequest::new("PEPE", "  ").is_complete());
    }

    #[test]
    fn test_result_serializes_snake_case() {
        let result = AnalysisResult {
            markdown: "M".into(),
            sources: vec![GroundingSource::new("https://x.com/a", "A")],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["markdown"], "M");
        assert_eq!(json["sources"][0]["uri"], "https://x.com/a");
    }
}
