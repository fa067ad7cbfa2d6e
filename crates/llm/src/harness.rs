//! Structured-LLM harness (C2) — spec §4.2. Wraps an [`LlmClient`] with
//! templating, JSON extraction, and a bounded repair-retry loop so every
//! call site gets a typed, schema-enforced value back.

use std::collections::HashMap;
use std::sync::Arc;

use labelforge_core::{LabelError, LabelResult};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::client::LlmClient;
use crate::extract::extract_json;
use crate::template::render;

/// Maximum number of *retries* after the first attempt (spec §4.2 step 5).
pub const MAX_REPAIR_RETRIES: u32 = 2;

pub struct StructuredLlmHarness {
    client: Arc<dyn LlmClient>,
}

impl StructuredLlmHarness {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Renders `prompt_template` against `variables`, calls the model, and
    /// coerces the response into `T`. `validate_input` runs first and
    /// fails fast with `BadInput` without touching the network — the
    /// fail-fast contract from spec §4.2 step 2. `validate_output` runs
    /// after successful JSON decoding and can reject semantically invalid
    /// (but well-typed) documents, triggering the repair loop just like a
    /// decode failure would.
    pub async fn invoke_structured<T, F, V>(
        &self,
        stage_name: &str,
        model: &str,
        prompt_template: &str,
        variables: &HashMap<String, String>,
        validate_input: F,
        validate_output: V,
    ) -> LabelResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Result<(), String>,
        V: Fn(&T) -> Result<(), Vec<String>>,
    {
        validate_input().map_err(LabelError::BadInput)?;

        let base_prompt = render(prompt_template, variables);
        let mut current_prompt = base_prompt.clone();
        let mut last_reason = String::new();
        let mut last_raw = String::new();

        for attempt in 0..=MAX_REPAIR_RETRIES {
            info!(stage = stage_name, attempt, "invoking structured LLM stage");

            let raw = self.client.complete(model, None, &current_prompt).await?;
            last_raw = raw.clone();

            match extract_json(&raw).and_then(|v| serde_json::from_value::<T>(v).ok()) {
                Some(parsed) => match validate_output(&parsed) {
                    Ok(()) => return Ok(parsed),
                    Err(issues) => {
                        last_reason = issues.join("; ");
                    }
                },
                None => {
                    last_reason = "could not extract well-formed JSON from response".to_string();
                }
            }

            warn!(
                stage = stage_name,
                attempt,
                reason = %last_reason,
                "structured LLM stage needs repair"
            );

            current_prompt = repair_prompt(&base_prompt, &last_raw, &last_reason);
        }

        Err(LabelError::StageFailed {
            stage: stage_name.to_string(),
            reason: format!(
                "{last_reason} (raw response excerpt: {})",
                excerpt(&last_raw)
            ),
        })
    }
}

fn repair_prompt(base_prompt: &str, previous_response: &str, reason: &str) -> String {
    format!(
        "{base_prompt}\n\n---\nYour previous response could not be used: {reason}.\n\
         Previous response:\n{previous_response}\n\n\
         Respond again with ONLY corrected JSON matching the required schema."
    )
}

fn excerpt(raw: &str) -> String {
    const MAX_LEN: usize = 200;
    if raw.len() <= MAX_LEN {
        raw.to_string()
    } else {
        format!("{}...", &raw[..MAX_LEN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockLlmClient, MockResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Widget {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn succeeds_on_first_well_formed_response() {
        let client = Arc::new(MockLlmClient::single(r#"{"name": "gizmo", "count": 3}"#));
        let harness = StructuredLlmHarness::new(client);

        let result: Widget = harness
            .invoke_structured(
                "test-stage",
                "test-model",
                "build a widget",
                &HashMap::new(),
                || Ok(()),
                |_: &Widget| Ok(()),
            )
            .await
            .unwrap();

        assert_eq!(result.name, "gizmo");
        assert_eq!(result.count, 3);
    }

    #[tokio::test]
    async fn repairs_after_malformed_response() {
        let client = Arc::new(MockLlmClient::new(vec![
            MockResponse::Ok("not json".to_string()),
            MockResponse::Ok(r#"{"name": "gizmo", "count": 3}"#.to_string()),
        ]));
        let harness = StructuredLlmHarness::new(client);

        let result: Widget = harness
            .invoke_structured(
                "test-stage",
                "test-model",
                "build a widget",
                &HashMap::new(),
                || Ok(()),
                |_: &Widget| Ok(()),
            )
            .await
            .unwrap();

        assert_eq!(result.count, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let client = Arc::new(MockLlmClient::new(vec![
            MockResponse::Ok("garbage one".to_string()),
            MockResponse::Ok("garbage two".to_string()),
            MockResponse::Ok("garbage three".to_string()),
        ]));
        let harness = StructuredLlmHarness::new(client);

        let result: LabelResult<Widget> = harness
            .invoke_structured(
                "test-stage",
                "test-model",
                "build a widget",
                &HashMap::new(),
                || Ok(()),
                |_: &Widget| Ok(()),
            )
            .await;

        assert!(matches!(result, Err(LabelError::StageFailed { .. })));
    }

    #[tokio::test]
    async fn bad_input_short_circuits_without_calling_the_model() {
        let client = Arc::new(MockLlmClient::new(Vec::new()));
        let harness = StructuredLlmHarness::new(client);

        let result: LabelResult<Widget> = harness
            .invoke_structured(
                "test-stage",
                "test-model",
                "build a widget",
                &HashMap::new(),
                || Err("input invalid".to_string()),
                |_: &Widget| Ok(()),
            )
            .await;

        assert!(matches!(result, Err(LabelError::BadInput(_))));
    }

    #[tokio::test]
    async fn output_validation_failure_triggers_repair_loop() {
        let client = Arc::new(MockLlmClient::new(vec![
            MockResponse::Ok(r#"{"name": "gizmo", "count": 0}"#.to_string()),
            MockResponse::Ok(r#"{"name": "gizmo", "count": 3}"#.to_string()),
        ]));
        let harness = StructuredLlmHarness::new(client);

        let result: Widget = harness
            .invoke_structured(
                "test-stage",
                "test-model",
                "build a widget",
                &HashMap::new(),
                || Ok(()),
                |w: &Widget| {
                    if w.count == 0 {
                        Err(vec!["count must be positive".to_string()])
                    } else {
                        Ok(())
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(result.count, 3);
    }
}
