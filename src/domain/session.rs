//! Interactive session state and its transitions.
//!
//! A session moves Idle → AwaitingResponse → AwaitingFeedback → Idle. The
//! transition methods here only update state; the orchestrator decides when
//! to call them and owns the side effects (backend call, log append).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chunk::ResultSet;
use crate::error::QaError;

/// Example content shown when a session starts and after feedback resolves
pub const DEFAULT_DOCUMENT: &str = "The central bank raised its benchmark rate by a quarter \
point on Wednesday, the third increase this year. Policymakers said inflation remains \
well above target and signalled that further hikes are likely. Bond yields climbed after \
the announcement while equity markets closed slightly lower.";

/// Query suggested to the user when none is given
pub const DEFAULT_QUERY: &str = "Who's increasing the rates?";

/// Where the session is in the request/response/feedback cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ready to accept a submission
    #[default]
    Idle,

    /// A request is in flight
    AwaitingResponse,

    /// A result is shown and must be rated or skipped
    AwaitingFeedback,
}

/// The document and query that produced the current result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub doc_text: String,
    pub query: String,
    pub n_of_results: u32,
}

/// State for one interactive session
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier (for logs)
    pub id: Uuid,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    state: SessionState,
    text: String,
    text_locked: bool,
    submission: Option<Submission>,
    results: Option<ResultSet>,
    feedback_resolved: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a session with the example document loaded
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: SessionState::Idle,
            text: DEFAULT_DOCUMENT.to_string(),
            text_locked: false,
            submission: None,
            results: None,
            feedback_resolved: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current editable document text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_text_locked(&self) -> bool {
        self.text_locked
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn is_feedback_resolved(&self) -> bool {
        self.feedback_resolved
    }

    /// Replace the editable text (e.g. after loading a file)
    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<(), QaError> {
        if self.text_locked {
            return Err(QaError::InvalidTransition {
                from: self.state,
                action: "edit text",
            });
        }
        self.text = text.into();
        Ok(())
    }

    /// Idle → AwaitingResponse
    pub fn begin_submission(&mut self, submission: Submission) -> Result<(), QaError> {
        self.expect_state(SessionState::Idle, "submit")?;

        if submission.doc_text.trim().is_empty() {
            return Err(QaError::EmptySubmission);
        }

        self.text = submission.doc_text.clone();
        self.text_locked = true;
        self.submission = Some(submission);
        self.state = SessionState::AwaitingResponse;
        Ok(())
    }

    /// AwaitingResponse → AwaitingFeedback
    pub fn receive_response(&mut self, results: ResultSet) -> Result<(), QaError> {
        self.expect_state(SessionState::AwaitingResponse, "accept a response")?;

        self.results = Some(results);
        self.feedback_resolved = false;
        self.text_locked = true;
        self.state = SessionState::AwaitingFeedback;
        Ok(())
    }

    /// AwaitingResponse → Idle, keeping the submitted text for a retry
    pub fn receive_failure(&mut self) -> Result<(), QaError> {
        self.expect_state(SessionState::AwaitingResponse, "accept a failure")?;

        self.submission = None;
        self.text_locked = false;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// AwaitingFeedback → Idle, restoring the example document
    pub fn resolve_feedback(&mut self) -> Result<(), QaError> {
        self.expect_state(SessionState::AwaitingFeedback, "resolve feedback")?;

        self.feedback_resolved = true;
        self.submission = None;
        self.text = DEFAULT_DOCUMENT.to_string();
        self.text_locked = false;
        self.state = SessionState::Idle;
        Ok(())
    }

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<(), QaError> {
        if self.state != expected {
            return Err(QaError::InvalidTransition {
                from: self.state,
                action,
            });
        }
        Ok(())
    }
}
