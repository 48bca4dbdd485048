//! Interpretation of backend results for display.
//!
//! The backend's order is authoritative: the first chunk of a document is its
//! best answer regardless of scores. Sentiment is optional and degrades to
//! [`SentimentVerdict::Unavailable`] instead of failing the render.

use std::fmt;

use serde::Serialize;

use crate::domain::{AnnotatedChunk, AnnotatedDocument, Sentiment};
use crate::error::QaError;

/// The top-ranked answer of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestAnswer {
    pub answer: String,
    pub score: f64,
}

impl fmt::Display for BestAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Score {:.5})", self.answer, self.score)
    }
}

/// Sentiment as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentVerdict {
    Positive,
    Neutral,
    Negative,
    /// The backend did not tag this chunk
    Unavailable,
}

impl From<Option<Sentiment>> for SentimentVerdict {
    fn from(label: Option<Sentiment>) -> Self {
        match label {
            Some(Sentiment::Positive) => SentimentVerdict::Positive,
            Some(Sentiment::Neutral) => SentimentVerdict::Neutral,
            Some(Sentiment::Negative) => SentimentVerdict::Negative,
            None => SentimentVerdict::Unavailable,
        }
    }
}

impl fmt::Display for SentimentVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SentimentVerdict::Positive => "Positive sentiment!",
            SentimentVerdict::Neutral => "Neutral sentiment!",
            SentimentVerdict::Negative => "Negative sentiment!",
            SentimentVerdict::Unavailable => "Couldn't retrieve sentiment for this chunk",
        };
        f.write_str(msg)
    }
}

/// A chunk split around its answer span, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChunk {
    pub before: String,
    pub answer: String,
    pub after: String,
    pub qa_score: f64,
    pub cls_score: f64,
    pub sentiment: SentimentVerdict,
}

impl fmt::Display for RenderedChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QA Score: {:.5}", self.qa_score)?;
        writeln!(f, "{}>>{}<<{}", self.before, self.answer, self.after)?;
        writeln!(f, "CLS Score: {:.5}", self.cls_score)?;
        write!(f, "{}", self.sentiment)
    }
}

/// Best answer plus the chunks selected for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub best: BestAnswer,
    pub chunks: Vec<RenderedChunk>,
    /// Chunks returned by the backend, before any display cap
    pub total_chunks: usize,
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Best response: {}", self.best)?;
        for (i, chunk) in self.chunks.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Chunk {}", i)?;
            writeln!(f, "{}", chunk)?;
        }
        if self.chunks.len() < self.total_chunks {
            writeln!(f)?;
            writeln!(
                f,
                "({} more chunks not shown)",
                self.total_chunks - self.chunks.len()
            )?;
        }
        Ok(())
    }
}

/// The first chunk's answer and score of the primary (first) document
pub fn best_answer(doc: &AnnotatedDocument) -> Result<BestAnswer, QaError> {
    best_answer_at(doc, 0)
}

fn best_answer_at(doc: &AnnotatedDocument, index: usize) -> Result<BestAnswer, QaError> {
    let top = doc
        .top_chunk()
        .ok_or(QaError::MissingResult { document: index })?;

    Ok(BestAnswer {
        answer: top.qa_answer().to_string(),
        score: top.qa_score(),
    })
}

/// Highlight the answer span and resolve the sentiment verdict
pub fn render_chunk(chunk: &AnnotatedChunk) -> RenderedChunk {
    let (before, answer, after) = chunk.split_at_answer();

    RenderedChunk {
        before: before.to_string(),
        answer: answer.to_string(),
        after: after.to_string(),
        qa_score: chunk.qa_score(),
        cls_score: chunk.cls_score(),
        sentiment: chunk.sentiment_label().into(),
    }
}

/// Render the document at position `index` of a result set, showing at most
/// `max_chunks` chunks when set
pub fn render_document(
    doc: &AnnotatedDocument,
    index: usize,
    max_chunks: Option<usize>,
) -> Result<RenderedDocument, QaError> {
    let best = best_answer_at(doc, index)?;
    let limit = max_chunks.unwrap_or(usize::MAX);

    Ok(RenderedDocument {
        best,
        chunks: doc.chunks.iter().take(limit).map(render_chunk).collect(),
        total_chunks: doc.chunks.len(),
    })
}
