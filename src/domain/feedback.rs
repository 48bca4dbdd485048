//! Feedback records captured after a result has been shown.

use serde::{Deserialize, Serialize};

/// Stored in place of a preferred answer when the user keeps the prediction
pub const NOT_PROVIDED: &str = "Not Provided";

/// One row of the feedback log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Full document text that was submitted
    pub source_text: String,

    /// Query the user asked
    pub query: String,

    /// Answer of the backend's best-ranked chunk
    pub predicted_best_answer: String,

    /// Text of the chunk the user preferred, or [`NOT_PROVIDED`]
    pub user_preferred_answer: String,
}

impl FeedbackRecord {
    pub fn new(
        source_text: impl Into<String>,
        query: impl Into<String>,
        predicted_best_answer: impl Into<String>,
        user_preferred_answer: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            query: query.into(),
            predicted_best_answer: predicted_best_answer.into(),
            user_preferred_answer: user_preferred_answer.into(),
        }
    }

    /// Whether the user supplied a correction
    pub fn has_correction(&self) -> bool {
        self.user_preferred_answer != NOT_PROVIDED
    }
}

/// What the user did when asked for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackChoice {
    /// Prefer the chunk at this rank position
    Chunk(usize),

    /// Record feedback without a correction
    NotProvided,

    /// Dismiss without recording anything
    Skip,
}

impl FeedbackChoice {
    /// Parse user input: a chunk index, `none` / `not provided`, or `skip` / `nah`.
    /// Blank input is not a choice.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "skip" | "nah" | "n" => Some(FeedbackChoice::Skip),
            "none" | "not provided" => Some(FeedbackChoice::NotProvided),
            other => other.parse::<usize>().ok().map(FeedbackChoice::Chunk),
        }
    }
}
