//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use semqa::domain::RequestPayload;
use semqa::Backend;

/// Backend returning a canned response and counting calls
pub struct MockBackend {
    response: Result<Value, String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RequestPayload>>,
}

impl MockBackend {
    pub fn responding(body: Value) -> Self {
        Self {
            response: Ok(body),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RequestPayload> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn query(&self, request: &RequestPayload) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(message) => anyhow::bail!("{}", message),
        }
    }
}

pub const DOC: &str = "Rates rose 2%. The Fed is hawkish.";
pub const QUERY: &str = "Who raised rates?";

/// A chunk in the backend's JSON shape, answer located by search
pub fn chunk(text: &str, answer: &str, qa_score: f64, sentiment: Option<&str>) -> Value {
    let start = text
        .find(answer)
        .map(|byte_idx| text[..byte_idx].chars().count())
        .expect("answer must occur in chunk text");
    let end = start + answer.chars().count();

    let mut tags = json!({"qa": {"start": start, "end": end, "answer": answer}});
    if let Some(label) = sentiment {
        tags["sentiment"] = json!({"label": label});
    }

    json!({
        "text": text,
        "tags": tags,
        "scores": {
            "qa_score": {"value": qa_score},
            "cls_score": {"value": 0.5}
        }
    })
}

/// Response with one document holding the given chunks
pub fn response(chunks: Vec<Value>) -> Value {
    json!({"data": [{"text": DOC, "chunks": chunks}]})
}

/// The two-chunk response used by most flow tests
pub fn two_chunk_response() -> Value {
    response(vec![
        chunk("Rates rose 2%.", "Rates rose 2%.", 0.87, Some("neutral")),
        chunk("The Fed is hawkish.", "The Fed", 0.42, None),
    ])
}
