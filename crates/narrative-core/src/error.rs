//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Fixed message shown to the user whenever an analysis fails.
pub const USER_FACING_FAILURE: &str =
    "Analysis failed. Please check the API key or try again later.";

/// Analysis error types
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Generation service returned an error; displays the service's message as is
    #[error("{0}")]
    Provider(String),

    /// Service unreachable or answering 5xx
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// API key rejected or missing
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Service quota exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The generation call did not finish in time
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure with no usable detail
    #[error("Unknown error during analysis")]
    Unknown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl AnalysisError {
    /// Wrap a free-form failure message, falling back to [`AnalysisError::Unknown`]
    /// when there is nothing to report.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            AnalysisError::Unknown
        } else {
            AnalysisError::Other(message)
        }
    }

    /// Check if error is retryable
    ///
    /// Informational only: the analyzer never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalysisError::ProviderUnavailable(_)
                | AnalysisError::RateLimited(_)
                | AnalysisError::Timeout(_)
        )
    }

    /// The message shown to users. Technical detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}
