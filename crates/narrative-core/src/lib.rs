//! # narrative-core
//!
//! Meme-coin narrative analysis: prompt construction, a provider-agnostic
//! generation client with search grounding, citation cleanup and the
//! application state machine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     AnalysisSession                           │
//! │   Idle ─▶ Analyzing ─▶ Success | Error                        │
//! │  ┌──────────────────────────────────────────────────────────┐ │
//! │  │                 NarrativeAnalyzer                        │ │
//! │  │  ┌──────────┐   ┌────────────────────┐   ┌────────────┐  │ │
//! │  │  │  prompt  │──▶│ GenerationProvider │──▶│  sources   │  │ │
//! │  │  │          │   │    (Strategy)      │   │  (dedupe)  │  │ │
//! │  │  └──────────┘   └────────────────────┘   └────────────┘  │ │
//! │  └──────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `GenerationProvider` trait lets the Gemini backend be swapped for
//! the scripted [`mock::MockProvider`] without touching the analyzer.

pub mod analyzer;
pub mod error;
pub mod mock;
pub mod model;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod sources;

pub use analyzer::{AnalyzerBuilder, AnalyzerConfig, NarrativeAnalyzer};
pub use error::{AnalysisError, Result};
pub use model::{AnalysisRequest, AnalysisResult, GroundingSource};
pub use provider::{GenerationProvider, GenerationRequest, GenerationResponse, Tool};
pub use session::{AnalysisSession, AnalysisState, SessionSnapshot, SubmitOutcome, Ticket};
