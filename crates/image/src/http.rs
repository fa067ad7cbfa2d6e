//! Production `ImageAdapter` backed by an external text-to-image service
//! (spec §4.3). Error classification mirrors the LLM client's: 429/5xx are
//! retryable network errors, 400 is a non-retryable validation error, and
//! 401/403 surface as auth-flavored validation errors.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use labelforge_core::{LabelError, LabelResult};
use serde::{Deserialize, Serialize};

use crate::adapter::ImageAdapter;
use crate::spec::{ImageMeta, ImageOutput, ImageSpec};

pub struct HttpImageAdapter {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpImageAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    guidance: f32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    image_b64: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[async_trait]
impl ImageAdapter for HttpImageAdapter {
    async fn generate(&self, spec: &ImageSpec) -> LabelResult<ImageOutput> {
        let (width, height) = spec.aspect.default_dimensions();
        let request = GenerateRequest {
            model: &self.model,
            prompt: &spec.prompt,
            negative_prompt: spec.negative_prompt.as_deref(),
            guidance: spec.clamped_guidance().unwrap_or(7.5),
            width,
            height,
        };

        let response = self
            .http
            .post(format!("{}/images/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LabelError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(LabelError::Network(format!(
                "image service transport error: {status}"
            )));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LabelError::Validation(format!(
                "image service auth error: {status}"
            )));
        }
        if status.is_client_error() {
            return Err(LabelError::Validation(format!(
                "image service rejected request: {status}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LabelError::Network(e.to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(parsed.image_b64)
            .map_err(|e| LabelError::Internal(anyhow::anyhow!("malformed image payload: {e}")))?;

        Ok(ImageOutput {
            bytes,
            meta: ImageMeta {
                model: self.model.clone(),
                width,
                height,
                seed: parsed.seed,
            },
        })
    }
}
