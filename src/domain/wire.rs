//! JSON shapes exchanged with the backend.
//!
//! The backend answers with loosely-typed documents whose chunks carry
//! `tags.qa.{start,end,answer}`, an optional `tags.sentiment.label` and
//! `scores.{qa_score,cls_score}.value`. Raw bodies are parsed with
//! [`ResponsePayload::from_json`], and absence is resolved exactly once, in
//! [`ResponsePayload::into_result_set`]: QA tags and both scores are
//! mandatory, sentiment is optional. A sentiment tag of any other shape is
//! treated as missing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::chunk::{AnnotatedChunk, AnnotatedDocument, ResultSet, Sentiment};
use crate::error::QaError;

/// Request body: the document plus query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub data: Vec<TextPayload>,
    pub parameters: RequestParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParameters {
    pub query: String,
    pub n_of_results: u32,
}

impl RequestPayload {
    /// Wrap a single document for submission
    pub fn single(text: &str, query: &str, n_of_results: u32) -> Self {
        Self {
            data: vec![TextPayload {
                text: text.to_string(),
            }],
            parameters: RequestParameters {
                query: query.to_string(),
                n_of_results,
            },
        }
    }
}

/// Response body as sent by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub data: Vec<DocumentPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub chunks: Vec<ChunkPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: ChunkTags,
    #[serde(default)]
    pub scores: HashMap<String, ScoreValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa: Option<QaTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaTag {
    pub start: Option<Offset>,
    pub end: Option<Offset>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreValue {
    pub value: Option<f64>,
}

/// Character offset; some backends emit offsets as floats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Int(u64),
    Float(f64),
}

impl Offset {
    fn to_index(self, field: &'static str) -> Result<usize, QaError> {
        match self {
            Offset::Int(v) => usize::try_from(v).map_err(|_| QaError::InvalidTag {
                field,
                reason: format!("{} does not fit in usize", v),
            }),
            Offset::Float(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
            Offset::Float(v) => Err(QaError::InvalidTag {
                field,
                reason: format!("{} is not a non-negative integer", v),
            }),
        }
    }
}

impl ResponsePayload {
    /// Parse a raw response body. Type mismatches become `MalformedResponse`.
    pub fn from_json(body: Value) -> Result<Self, QaError> {
        serde_json::from_value(body).map_err(|e| QaError::MalformedResponse {
            reason: e.to_string(),
        })
    }

    /// Convert into the typed model, validating every chunk
    pub fn into_result_set(self) -> Result<ResultSet, QaError> {
        let documents = self
            .data
            .into_iter()
            .map(DocumentPayload::into_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResultSet::new(documents))
    }
}

impl DocumentPayload {
    fn into_document(self) -> Result<AnnotatedDocument, QaError> {
        let chunks = self
            .chunks
            .into_iter()
            .map(ChunkPayload::into_chunk)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AnnotatedDocument::new(self.text, chunks))
    }
}

impl ChunkPayload {
    fn into_chunk(mut self) -> Result<AnnotatedChunk, QaError> {
        let qa = self.tags.qa.ok_or(QaError::MissingTag { field: "qa" })?;
        let start = qa
            .start
            .ok_or(QaError::MissingTag { field: "qa.start" })?
            .to_index("qa.start")?;
        let end = qa
            .end
            .ok_or(QaError::MissingTag { field: "qa.end" })?
            .to_index("qa.end")?;
        let answer = qa.answer.ok_or(QaError::MissingTag { field: "qa.answer" })?;

        let qa_score = take_score(&mut self.scores, "qa_score")?;
        let cls_score = take_score(&mut self.scores, "cls_score")?;

        let sentiment = self.tags.sentiment.as_ref().and_then(sentiment_label);

        AnnotatedChunk::new(self.text, answer, start, end, qa_score, sentiment, cls_score)
    }
}

fn sentiment_label(tag: &Value) -> Option<Sentiment> {
    let label = match tag.get("label") {
        Some(Value::String(label)) => label,
        Some(Value::Null) | None => return None,
        Some(other) => {
            debug!(label = %other, "Ignoring non-string sentiment label");
            return None;
        }
    };

    let parsed = Sentiment::from_label(label);
    if parsed.is_none() {
        debug!(%label, "Unrecognized sentiment label");
    }
    parsed
}

fn take_score(
    scores: &mut HashMap<String, ScoreValue>,
    field: &'static str,
) -> Result<f64, QaError> {
    scores
        .remove(field)
        .and_then(|s| s.value)
        .ok_or(QaError::MissingTag { field })
}
