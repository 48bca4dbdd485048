//! JSON-over-HTTP backend client.
//!
//! Endpoint: POST http://{host}:{port}{endpoint}
//! No client-side timeout is set; timeout policy belongs to the server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::Backend;
use crate::domain::RequestPayload;

/// Connection settings for the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
}

impl HttpBackendConfig {
    /// Full request URL
    pub fn url(&self) -> String {
        let endpoint = self.endpoint.trim_start_matches('/');
        format!("http://{}:{}/{}", self.host, self.port, endpoint)
    }
}

/// Backend reached over HTTP
pub struct HttpBackend {
    url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new client
    pub fn new(config: &HttpBackendConfig) -> Self {
        Self {
            url: config.url(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn query(&self, request: &RequestPayload) -> Result<Value> {
        debug!(url = %self.url, "Sending QA request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error ({}): {}", status, text);
        }

        response
            .json::<Value>()
            .await
            .context("Backend response is not JSON")
    }
}
