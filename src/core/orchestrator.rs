//! Drives one request/response/feedback cycle for a session.
//!
//! Coordinates the backend call, response validation, and feedback
//! recording, applying each outcome to the session state machine.

use std::path::Path;

use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::adapters::Backend;
use crate::domain::{
    FeedbackChoice, FeedbackRecord, RequestPayload, ResponsePayload, ResultSet, Session,
    SessionState, Submission, NOT_PROVIDED,
};
use crate::error::QaError;

use super::interpreter::best_answer;
use super::recorder;

/// Smallest number of results that can be requested
pub const MIN_RESULTS: u32 = 1;

/// Largest number of results that can be requested
pub const MAX_RESULTS: u32 = 10;

/// Main session orchestrator
pub struct QueryOrchestrator<B> {
    backend: B,
}

impl<B: Backend> QueryOrchestrator<B> {
    /// Create a new orchestrator over a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit a document and query, waiting for the backend's answer.
    ///
    /// On success the session is left in `AwaitingFeedback` with the result
    /// stored. Empty text is rejected before any backend call. Backend and
    /// validation failures return the session to `Idle` with its text kept.
    #[instrument(
        skip(self, session, doc_text, query),
        fields(session_id = %session.id, started_at = %session.started_at, backend = %self.backend.name())
    )]
    pub async fn submit(
        &self,
        session: &mut Session,
        doc_text: &str,
        query: &str,
        n_of_results: u32,
    ) -> Result<(), QaError> {
        let n_of_results = n_of_results.clamp(MIN_RESULTS, MAX_RESULTS);

        let submission = Submission {
            doc_text: doc_text.to_string(),
            query: query.to_string(),
            n_of_results,
        };
        if let Err(e) = session.begin_submission(submission) {
            warn!(error = %e, "Submission rejected");
            return Err(e);
        }

        info!(n_of_results, chars = doc_text.chars().count(), "Submitting document");

        let request = RequestPayload::single(doc_text, query, n_of_results);
        let outcome = match self.backend.query(&request).await {
            Ok(body) => decode_response(body),
            Err(e) => Err(QaError::BackendUnavailable {
                message: format!("{:#}", e),
            }),
        };

        match outcome {
            Ok(results) => {
                info!(documents = results.documents.len(), "Response received");
                session.receive_response(results)
            }
            Err(e) => {
                error!(error = %e, "Request failed");
                session.receive_failure()?;
                Err(e)
            }
        }
    }

    /// Resolve the pending result with the user's feedback.
    ///
    /// `Skip` writes nothing. Any other choice appends one row to the log at
    /// `feedback_path` and returns the record. If the append fails the
    /// session stays in `AwaitingFeedback` so the user can retry or skip.
    #[instrument(
        skip(self, session),
        fields(session_id = %session.id, started_at = %session.started_at)
    )]
    pub fn give_feedback(
        &self,
        session: &mut Session,
        feedback_path: &Path,
        choice: FeedbackChoice,
    ) -> Result<Option<FeedbackRecord>, QaError> {
        if session.state() != SessionState::AwaitingFeedback {
            let e = QaError::InvalidTransition {
                from: session.state(),
                action: "give feedback",
            };
            warn!(error = %e, "Feedback rejected");
            return Err(e);
        }

        if choice == FeedbackChoice::Skip {
            session.resolve_feedback()?;
            info!("Feedback skipped");
            return Ok(None);
        }

        let record = match build_record(session, choice) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Feedback rejected");
                return Err(e);
            }
        };

        if let Err(e) = recorder::record(feedback_path, &record) {
            error!(error = %e, "Feedback not recorded");
            return Err(e);
        }

        session.resolve_feedback()?;
        info!(corrected = record.has_correction(), "Feedback recorded");
        Ok(Some(record))
    }
}

/// Decode the body and require at least one chunk per document
fn decode_response(body: Value) -> Result<ResultSet, QaError> {
    let results = ResponsePayload::from_json(body)?.into_result_set()?;

    if results.is_empty() {
        return Err(QaError::MissingResult { document: 0 });
    }
    for (idx, doc) in results.documents.iter().enumerate() {
        if doc.chunks.is_empty() {
            return Err(QaError::MissingResult { document: idx });
        }
    }

    Ok(results)
}

fn build_record(session: &Session, choice: FeedbackChoice) -> Result<FeedbackRecord, QaError> {
    let submission = session.submission().ok_or(QaError::InvalidTransition {
        from: session.state(),
        action: "give feedback",
    })?;
    let doc = session
        .results()
        .and_then(ResultSet::first)
        .ok_or(QaError::MissingResult { document: 0 })?;

    let predicted = best_answer(doc)?;
    let preferred = match choice {
        FeedbackChoice::Chunk(index) => doc
            .chunks
            .get(index)
            .map(|c| c.text().to_string())
            .ok_or(QaError::InvalidSelection {
                index,
                available: doc.chunks.len(),
            })?,
        FeedbackChoice::NotProvided | FeedbackChoice::Skip => NOT_PROVIDED.to_string(),
    };

    Ok(FeedbackRecord::new(
        submission.doc_text.clone(),
        submission.query.clone(),
        predicted.answer,
        preferred,
    ))
}
