//! Error taxonomy for the interpretation and feedback workflow.
//!
//! Every variant resolves to a well-defined session state; nothing here is
//! fatal to the process. User-input problems are reported as warnings
//! (see [`QaError::is_warning`]), everything else as errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SessionState;

/// Errors surfaced by the data model, interpreter, recorder and orchestrator
#[derive(Debug, Error)]
pub enum QaError {
    #[error("There's no text to send! Add a document or write/paste your text")]
    EmptySubmission,

    #[error("Backend returned no chunks for document {document}")]
    MissingResult { document: usize },

    #[error("Format {content_type} not supported! Only plain text documents are supported")]
    UnsupportedFormat { content_type: String },

    #[error("Failed to write feedback to {}: {source}", path.display())]
    FeedbackWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error(
        "Chunk answer span [{start}, {end}) does not match answer {answer:?} (span holds {actual:?})"
    )]
    ChunkIntegrity {
        start: usize,
        end: usize,
        answer: String,
        actual: String,
    },

    #[error("Chunk answer span [{start}, {end}) is out of bounds for text of {len} chars")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Backend response is missing required field '{field}'")]
    MissingTag { field: &'static str },

    #[error("Backend response is malformed: {reason}")]
    MalformedResponse { reason: String },

    #[error("Backend response field '{field}' is invalid: {reason}")]
    InvalidTag { field: &'static str, reason: String },

    #[error("Cannot {action} while session is {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    #[error("Selected chunk {index} does not exist (only {available} chunks)")]
    InvalidSelection { index: usize, available: usize },

    #[error("Malformed feedback row at line {line}: {reason}")]
    MalformedLogRow { line: usize, reason: String },
}

impl QaError {
    /// True for user-input errors that are shown as warnings and leave the
    /// session untouched.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            QaError::EmptySubmission
                | QaError::UnsupportedFormat { .. }
                | QaError::InvalidTransition { .. }
                | QaError::InvalidSelection { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_classification() {
        assert!(QaError::EmptySubmission.is_warning());
        assert!(QaError::InvalidSelection {
            index: 4,
            available: 2
        }
        .is_warning());

        assert!(!QaError::MissingResult { document: 0 }.is_warning());
        assert!(!QaError::BackendUnavailable {
            message: "connection refused".to_string()
        }
        .is_warning());
    }

    #[test]
    fn test_feedback_write_keeps_source() {
        let err = QaError::FeedbackWrite {
            path: PathBuf::from("/missing/dir/feedback.tsv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };

        let message = err.to_string();
        assert!(message.contains("/missing/dir/feedback.tsv"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
