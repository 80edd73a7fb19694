//! # narrative-runtime
//!
//! Generation backends for the narrative analyzer.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language API with Google Search grounding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use narrative_runtime::GeminiProvider;
//!
//! let provider = GeminiProvider::from_env()?;
//! let analyzer = AnalyzerBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use narrative_core::{
    AnalysisError, AnalysisRequest, AnalysisResult, AnalysisSession, GenerationProvider,
    NarrativeAnalyzer, Result,
};
