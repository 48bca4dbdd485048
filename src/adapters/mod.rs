//! Backend interfaces.
//!
//! The orchestrator talks to the question-answering service through the
//! [`Backend`] trait. Implementations return the raw JSON body; typed
//! decoding and validation happen in the orchestrator, so an error from
//! `query` always means the transport failed.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::RequestPayload;

// Re-export the HTTP backend
pub use http::{HttpBackend, HttpBackendConfig};

/// Trait for question-answering backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Send one request and wait for the raw response body
    async fn query(&self, request: &RequestPayload) -> Result<Value>;
}
