//! Core workflow logic.
//!
//! This module contains:
//! - Interpreter: Best-answer selection and chunk rendering
//! - Recorder: Append-only feedback log
//! - Orchestrator: Session-driving request/response/feedback cycle

pub mod interpreter;
pub mod orchestrator;
pub mod recorder;

// Re-export commonly used types
pub use interpreter::{
    best_answer, render_chunk, render_document, BestAnswer, RenderedChunk, RenderedDocument,
    SentimentVerdict,
};
pub use orchestrator::{QueryOrchestrator, MAX_RESULTS, MIN_RESULTS};
pub use recorder::{format_row, read_log, record};
