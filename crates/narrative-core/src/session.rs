//! Analysis Session
//!
//! The application state machine. One session owns the current
//! [`AnalysisState`] together with the latest result or error and drives
//!
//! ```text
//! Idle ──submit──▶ Analyzing ──ok──▶ Success ─┐
//!                     │  ▲                     │
//!                     │  └──────resubmit───────┤
//!                     └──err──▶ Error ─────────┘
//! ```
//!
//! Observers read immutable [`SessionSnapshot`]s, either on demand or via a
//! `tokio::sync::watch` subscription.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::analyzer::NarrativeAnalyzer;
use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisRequest, AnalysisResult};

/// UI-facing analysis state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing,
    Success,
    Error,
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisState::Idle => write!(f, "IDLE"),
            AnalysisState::Analyzing => write!(f, "ANALYZING"),
            AnalysisState::Success => write!(f, "SUCCESS"),
            AnalysisState::Error => write!(f, "ERROR"),
        }
    }
}

/// Identifies one accepted submission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket(Uuid);

impl Ticket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Ticket {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the presentation layer may read
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: AnalysisState,

    pub result: Option<AnalysisResult>,

    /// Fixed user-facing message, never the technical detail
    pub error: Option<String>,

    /// Submission currently owning the session
    pub ticket: Option<Ticket>,

    /// The request being (or last) analyzed
    pub request: Option<AnalysisRequest>,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn is_analyzing(&self) -> bool {
        self.state == AnalysisState::Analyzing
    }
}

/// What happened to a submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A field was empty; nothing changed
    Ignored,

    /// Another analysis is in flight; nothing changed
    Busy,

    /// Analysis started under this ticket
    Started(Ticket),
}

/// The application state machine
pub struct AnalysisSession {
    analyzer: Arc<NarrativeAnalyzer>,
    state: watch::Sender<SessionSnapshot>,
}

impl AnalysisSession {
    pub fn new(analyzer: Arc<NarrativeAnalyzer>) -> Self {
        Self {
            analyzer,
            state: watch::Sender::new(SessionSnapshot::default()),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Current state
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().state
    }

    /// Receive every subsequent snapshot change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn analyzer(&self) -> &Arc<NarrativeAnalyzer> {
        &self.analyzer
    }

    /// Validate a submission and enter `Analyzing`.
    ///
    /// Clears the previous result and error. Does not start the analysis.
    pub fn begin(&self, request: &AnalysisRequest) -> SubmitOutcome {
        if !request.is_complete() {
            tracing::debug!("Ignoring submission with empty field");
            return SubmitOutcome::Ignored;
        }

        let ticket = Ticket::new();
        let mut outcome = SubmitOutcome::Busy;

        self.state.send_if_modified(|snapshot| {
            if snapshot.is_analyzing() {
                return false;
            }
            *snapshot = SessionSnapshot {
                state: AnalysisState::Analyzing,
                result: None,
                error: None,
                ticket: Some(ticket),
                request: Some(request.clone()),
                started_at: Some(Utc::now()),
                finished_at: None,
            };
            outcome = SubmitOutcome::Started(ticket);
            true
        });

        match outcome {
            SubmitOutcome::Started(_) => tracing::info!(
                %ticket,
                name = %request.name,
                contract_address = %request.contract_address,
                "Analysis started"
            ),
            _ => tracing::warn!(
                name = %request.name,
                "Rejecting submission while an analysis is in flight"
            ),
        }

        outcome
    }

    /// Apply the outcome of the analysis started under `ticket`.
    ///
    /// Returns the settled snapshot for `ticket`, or `None` (changing
    /// nothing) when `ticket` is not the submission currently in flight.
    pub fn complete(
        &self,
        ticket: Ticket,
        outcome: Result<AnalysisResult>,
    ) -> Option<SessionSnapshot> {
        let mut settled = None;

        self.state.send_if_modified(|snapshot| {
            if !snapshot.is_analyzing() || snapshot.ticket != Some(ticket) {
                return false;
            }
            snapshot.finished_at = Some(Utc::now());
            match &outcome {
                Ok(result) => {
                    snapshot.state = AnalysisState::Success;
                    snapshot.result = Some(result.clone());
                }
                Err(e) => {
                    snapshot.state = AnalysisState::Error;
                    snapshot.error = Some(e.user_message().to_string());
                }
            }
            settled = Some(snapshot.clone());
            true
        });

        match (&outcome, settled.is_some()) {
            (_, false) => tracing::debug!(%ticket, "Discarding stale completion"),
            (Ok(result), true) => {
                tracing::info!(%ticket, sources = result.sources.len(), "Analysis succeeded")
            }
            (Err(e), true) => tracing::error!(%ticket, error = %e, "Analysis failed"),
        }

        settled
    }

    /// Submit and return immediately; observe the result through
    /// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe).
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, request: AnalysisRequest) -> SubmitOutcome {
        self.start(request).0
    }

    /// Submit and wait until the analysis settles.
    ///
    /// The returned snapshot is the one this submission settled into, even
    /// if another submission has started since. The analysis runs on its
    /// own task, so dropping this future does not strand the session in
    /// `Analyzing`.
    pub async fn submit_and_wait(
        self: &Arc<Self>,
        request: AnalysisRequest,
    ) -> (SubmitOutcome, SessionSnapshot) {
        let (outcome, handle) = self.start(request);

        let (SubmitOutcome::Started(ticket), Some(handle)) = (outcome, handle) else {
            return (outcome, self.snapshot());
        };

        let settled = match handle.await {
            Ok(settled) => settled,
            Err(e) => self.complete(
                ticket,
                Err(AnalysisError::Other(format!("analysis task aborted: {e}"))),
            ),
        };

        (outcome, settled.unwrap_or_else(|| self.snapshot()))
    }

    fn start(
        self: &Arc<Self>,
        request: AnalysisRequest,
    ) -> (SubmitOutcome, Option<JoinHandle<Option<SessionSnapshot>>>) {
        let outcome = self.begin(&request);
        let SubmitOutcome::Started(ticket) = outcome else {
            return (outcome, None);
        };

        let session = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let analysis = session
                .analyzer
                .analyze(&request.name, &request.contract_address);

            // a panicking provider must still release the session
            let result = match AssertUnwindSafe(analysis).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "analysis task panicked".into());
                    Err(AnalysisError::from_message(message))
                }
            };
            session.complete(ticket, result)
        });

        (outcome, Some(handle))
    }
}
