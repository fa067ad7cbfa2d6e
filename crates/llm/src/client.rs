//! The underlying text-LLM transport (spec §4.2 step 3). `LlmClient` is the
//! seam the harness depends on so stage bodies can be tested against a
//! deterministic mock instead of a live model.

use async_trait::async_trait;
use labelforge_core::{LabelError, LabelResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `system` + `prompt` to the model and returns the raw text
    /// response. Network/rate-limit failures surface as
    /// `LabelError::Network` (retryable); malformed requests as
    /// `LabelError::BadInput`.
    async fn complete(&self, model: &str, system: Option<&str>, prompt: &str)
        -> LabelResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Production client against an OpenAI-compatible chat-completions API.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpLlmClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
    ) -> LabelResult<String> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatRequest {
            model,
            messages,
            temperature: 0.7,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LabelError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(LabelError::Network(format!("LLM transport error: {status}")));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LabelError::BadInput(format!("LLM auth error: {status}")));
        }
        if status.is_client_error() {
            return Err(LabelError::BadInput(format!("LLM rejected request: {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LabelError::Network(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LabelError::Network("LLM response had no choices".to_string()))
    }
}

/// Deterministic client for tests: returns a queue of canned responses per
/// call, optionally failing the first N attempts to exercise the retry
/// path (spec §8 scenario 2, "Retry-on-transient-failure").
pub struct MockLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<MockResponse>>,
}

pub enum MockResponse {
    Ok(String),
    TransientError,
}

impl MockLlmClient {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
        }
    }

    pub fn single(response: impl Into<String>) -> Self {
        Self::new(vec![MockResponse::Ok(response.into())])
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        _model: &str,
        _system: Option<&str>,
        _prompt: &str,
    ) -> LabelResult<String> {
        let mut queue = self.responses.lock().expect("mock lock poisoned");
        match queue.pop_front() {
            Some(MockResponse::Ok(body)) => Ok(body),
            Some(MockResponse::TransientError) => {
                Err(LabelError::Network("mock transient failure".to_string()))
            }
            None => Err(LabelError::Network("mock client exhausted".to_string())),
        }
    }
}
