//! Domain types for the QA front end.
//!
//! This module contains the core data structures:
//! - Chunk: Annotated chunks, documents and result sets
//! - Feedback: Feedback records and user choices
//! - Session: Interactive session state machine
//! - Wire: Backend request/response shapes

pub mod chunk;
pub mod feedback;
pub mod session;
pub mod wire;

// Re-export commonly used types
pub use chunk::{AnnotatedChunk, AnnotatedDocument, ResultSet, Sentiment};
pub use feedback::{FeedbackChoice, FeedbackRecord, NOT_PROVIDED};
pub use session::{Session, SessionState, Submission, DEFAULT_DOCUMENT, DEFAULT_QUERY};
pub use wire::{RequestPayload, ResponsePayload};
