//! Vision refiner (C6, spec §4.6): proposes bounded edits to a rendered
//! preview. Schema-constrained via the C2 harness; confidence is an
//! advisory ordering hint only, never a gate (spec §4.6).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use labelforge_core::{LabelDocument, LabelResult, Submission};
use labelforge_llm::StructuredLlmHarness;

use crate::operations::{EditOperation, ProposeEditsResponse};

#[async_trait]
pub trait VisionRefiner: Send + Sync {
    async fn propose_edits(
        &self,
        submission: &Submission,
        document: &LabelDocument,
        preview_url: &str,
    ) -> LabelResult<ProposeEditsResponse>;
}

const REFINE_PROMPT_TEMPLATE: &str = r#"You are reviewing a rendered wine label preview image at {preview_url}.

Wine: {wine_name} by {producer_name}, {vintage} {variety} from {region}, {appellation}.
Style: {style}.

Current document (JSON):
{document_json}

Propose at most 10 edit operations to improve the label's visual design. Each
operation must be one of: update_palette, update_typography, update_element,
add_element, remove_element. Respond with JSON: {{"operations": [...], "reasoning": "...", "confidence": 0.0-1.0}}.
If the label already looks correct, return an empty operations array."#;

pub struct LlmVisionRefiner {
    harness: StructuredLlmHarness,
    model: String,
}

impl LlmVisionRefiner {
    pub fn new(harness: StructuredLlmHarness, model: impl Into<String>) -> Self {
        Self {
            harness,
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionRefiner for LlmVisionRefiner {
    async fn propose_edits(
        &self,
        submission: &Submission,
        document: &LabelDocument,
        preview_url: &str,
    ) -> LabelResult<ProposeEditsResponse> {
        let document_json = serde_json::to_string(document)?;
        let mut variables = HashMap::new();
        variables.insert("preview_url".to_string(), preview_url.to_string());
        variables.insert("wine_name".to_string(), submission.wine_name.clone());
        variables.insert("producer_name".to_string(), submission.producer_name.clone());
        variables.insert("vintage".to_string(), submission.vintage.clone());
        variables.insert("variety".to_string(), submission.variety.clone());
        variables.insert("region".to_string(), submission.region.clone());
        variables.insert("appellation".to_string(), submission.appellation.clone());
        variables.insert("style".to_string(), format!("{:?}", submission.style).to_lowercase());
        variables.insert("document_json".to_string(), document_json);

        self.harness
            .invoke_structured(
                "refine",
                &self.model,
                REFINE_PROMPT_TEMPLATE,
                &variables,
                || Ok(()),
                |response: &ProposeEditsResponse| response.validate_shape(),
            )
            .await
    }
}

/// Deterministic refiner for tests: returns a fixed queue of responses,
/// one per call, so a test can script a multi-iteration refine loop.
pub struct MockVisionRefiner {
    responses: std::sync::Mutex<std::collections::VecDeque<Vec<EditOperation>>>,
}

impl MockVisionRefiner {
    pub fn new(responses: Vec<Vec<EditOperation>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![Vec::new()])
    }
}

#[async_trait]
impl VisionRefiner for MockVisionRefiner {
    async fn propose_edits(
        &self,
        _submission: &Submission,
        _document: &LabelDocument,
        _preview_url: &str,
    ) -> LabelResult<ProposeEditsResponse> {
        let operations = self
            .responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_default();

        Ok(ProposeEditsResponse {
            operations,
            reasoning: "mock refiner".to_string(),
            confidence: Some(0.9),
        })
    }
}

pub type SharedVisionRefiner = Arc<dyn VisionRefiner>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_refiner_returns_empty_on_exhaustion_triggering_early_exit() {
        let refiner = MockVisionRefiner::empty();
        let submission = sample_submission();
        let document = sample_document();

        let response = refiner.propose_edits(&submission, &document, "https://cdn/preview.png").await.unwrap();

        assert!(response.operations.is_empty());
    }

    fn sample_submission() -> Submission {
        use chrono::Utc;
        use labelforge_core::Style;
        use uuid::Uuid;

        Submission {
            id: Uuid::new_v4(),
            producer_name: "Ch\u{e2}teau Test".to_string(),
            wine_name: "Grand Cru".to_string(),
            vintage: "2020".to_string(),
            variety: "Cabernet Sauvignon".to_string(),
            region: "Bordeaux".to_string(),
            appellation: "M\u{e9}doc".to_string(),
            style: Style::Classic,
            created_at: Utc::now(),
        }
    }

    fn sample_document() -> LabelDocument {
        use labelforge_core::{Canvas, Contrast, Font, FontStyle, Hierarchy, Palette, ProducerEmphasis, RegionDisplay, Temperature, Typography, VintageProminence};

        let canvas = Canvas { width: 750.0, height: 1000.0, dpi: 300.0, background: "#fff".to_string() };
        let palette = Palette {
            primary: "#111".to_string(),
            secondary: "#222".to_string(),
            accent: "#333".to_string(),
            background: "#fff".to_string(),
            temperature: Temperature::Neutral,
            contrast: Contrast::Medium,
        };
        let font = Font { family: "Garamond".to_string(), weight: 400, style: FontStyle::Normal, letter_spacing: 0.0 };
        let typography = Typography {
            primary: font.clone(),
            secondary: font,
            hierarchy: Hierarchy {
                producer_emphasis: ProducerEmphasis::Dominant,
                vintage_prominence: VintageProminence::Standard,
                region_display: RegionDisplay::Integrated,
            },
        };
        LabelDocument::skeleton(canvas, palette, typography)
    }
}
