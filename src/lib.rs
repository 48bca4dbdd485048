//! semqa - Front end for an extractive question-answering backend
//!
//! A user submits a document and a query; the backend returns the document
//! split into scored chunks, each carrying an answer span and an optional
//! sentiment label. The best-ranked answer is shown and the user can record
//! which chunk they would have preferred.
//!
//! # Architecture
//!
//! The workflow is an explicit session state machine:
//! - Idle → AwaitingResponse on submit
//! - AwaitingResponse → AwaitingFeedback on a valid response
//! - AwaitingResponse → Idle on failure (text kept for a retry)
//! - AwaitingFeedback → Idle on feedback or skip
//!
//! # Modules
//!
//! - `adapters`: Backend trait and HTTP client
//! - `core`: Interpreter, feedback recorder, orchestrator
//! - `domain`: Data model, wire contract, session state
//! - `intake`: Loading document text
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Ask a question about a file
//! semqa ask --file article.txt --query "Who raised rates?"
//!
//! # Review recorded feedback
//! semqa feedback --limit 10
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod intake;

// Re-export main types at crate root for convenience
pub use crate::adapters::{Backend, HttpBackend, HttpBackendConfig};
pub use crate::core::{best_answer, render_chunk, QueryOrchestrator, SentimentVerdict};
pub use crate::domain::{
    AnnotatedChunk, AnnotatedDocument, FeedbackChoice, FeedbackRecord, ResultSet, Sentiment,
    Session, SessionState,
};
pub use crate::error::QaError;
