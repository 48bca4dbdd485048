//! Annotated chunks, documents and result sets returned by the backend.
//!
//! Chunks are only constructed through [`AnnotatedChunk::new`], which checks
//! the answer span against the chunk text. Offsets count characters, not
//! bytes.

use serde::{Deserialize, Serialize};

use crate::error::QaError;

/// Sentiment verdict attached to a chunk by the backend classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Parse a backend label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// One scored span of a document with QA and sentiment tags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedChunk {
    text: String,
    qa_answer: String,
    qa_start: usize,
    qa_end: usize,
    qa_score: f64,
    sentiment_label: Option<Sentiment>,
    cls_score: f64,
}

impl AnnotatedChunk {
    /// Build a chunk, rejecting spans that fall outside `text` or do not
    /// reproduce `qa_answer`.
    pub fn new(
        text: String,
        qa_answer: String,
        qa_start: usize,
        qa_end: usize,
        qa_score: f64,
        sentiment_label: Option<Sentiment>,
        cls_score: f64,
    ) -> Result<Self, QaError> {
        let actual = char_slice(&text, qa_start, qa_end)?;
        if actual != qa_answer {
            return Err(QaError::ChunkIntegrity {
                start: qa_start,
                end: qa_end,
                answer: qa_answer,
                actual: actual.to_string(),
            });
        }

        Ok(Self {
            text,
            qa_answer,
            qa_start,
            qa_end,
            qa_score,
            sentiment_label,
            cls_score,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn qa_answer(&self) -> &str {
        &self.qa_answer
    }

    pub fn qa_start(&self) -> usize {
        self.qa_start
    }

    pub fn qa_end(&self) -> usize {
        self.qa_end
    }

    pub fn qa_score(&self) -> f64 {
        self.qa_score
    }

    pub fn sentiment_label(&self) -> Option<Sentiment> {
        self.sentiment_label
    }

    pub fn cls_score(&self) -> f64 {
        self.cls_score
    }

    /// Split the chunk text into (before, answer, after) around the span
    pub fn split_at_answer(&self) -> (&str, &str, &str) {
        // Span was validated at construction, so the offsets are in range.
        let start = byte_offset(&self.text, self.qa_start);
        let end = byte_offset(&self.text, self.qa_end);
        (
            &self.text[..start],
            &self.text[start..end],
            &self.text[end..],
        )
    }
}

/// The chunks returned for one submitted document, in backend rank order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedDocument {
    pub source_text: String,
    pub chunks: Vec<AnnotatedChunk>,
}

impl AnnotatedDocument {
    pub fn new(source_text: String, chunks: Vec<AnnotatedChunk>) -> Self {
        Self {
            source_text,
            chunks,
        }
    }

    /// The backend's best-ranked chunk (first by position)
    pub fn top_chunk(&self) -> Option<&AnnotatedChunk> {
        self.chunks.first()
    }
}

/// All documents returned for one query
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    pub documents: Vec<AnnotatedDocument>,
}

impl ResultSet {
    pub fn new(documents: Vec<AnnotatedDocument>) -> Self {
        Self { documents }
    }

    pub fn first(&self) -> Option<&AnnotatedDocument> {
        self.documents.first()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Byte offset of the `char_idx`-th character (or `text.len()` at the end)
fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Slice `text` by character offsets `[start, end)`
fn char_slice(text: &str, start: usize, end: usize) -> Result<&str, QaError> {
    let len = text.chars().count();
    if start > end || end > len {
        return Err(QaError::SpanOutOfBounds { start, end, len });
    }
    Ok(&text[byte_offset(text, start)..byte_offset(text, end)])
}
