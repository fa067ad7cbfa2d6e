//! Renderer client (C5, spec §4.5). The orchestrator treats rendering as an
//! opaque async call returning PNG bytes; production implementations may be
//! out-of-process rasterizers reachable over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use labelforge_core::{LabelDocument, LabelError, LabelResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub debug: bool,
    pub timeout_ms: u64,
}

impl RenderOptions {
    pub fn with_default_timeout() -> Self {
        Self {
            debug: false,
            timeout_ms: 30_000,
        }
    }
}

#[async_trait]
pub trait RendererClient: Send + Sync {
    async fn render(&self, document: &LabelDocument, options: RenderOptions) -> LabelResult<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    dsl: &'a LabelDocument,
    debug: bool,
}

/// Production client: POSTs the document DSL to an out-of-process
/// rasterizer and returns the PNG body (spec §6 "Render endpoint").
pub struct HttpRendererClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRendererClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RendererClient for HttpRendererClient {
    async fn render(&self, document: &LabelDocument, options: RenderOptions) -> LabelResult<Vec<u8>> {
        let request = RenderRequest {
            dsl: document,
            debug: options.debug,
        };

        let response = self
            .http
            .post(format!("{}/render", self.base_url))
            .timeout(Duration::from_millis(options.timeout_ms))
            .json(&request)
            .send()
            .await
            .map_err(|e| LabelError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(LabelError::Validation(format!(
                "renderer rejected document: {status}"
            )));
        }
        if !status.is_success() {
            return Err(LabelError::Network(format!("renderer error: {status}")));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| LabelError::Network(e.to_string()))
    }
}
