//! Pipeline configuration: stage→model map and the adapters, set once at
//! startup and treated as read-only thereafter (spec §5 "Shared-resource
//! policy").

use std::time::Duration;

use crate::retry::BackoffConfig;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub design_scheme_model: String,
    pub image_prompts_model: String,
    pub detailed_layout_model: String,
    pub refine_model: String,
    pub max_image_concurrency: usize,
    pub max_refine_iterations: u32,
    pub llm_timeout: Duration,
    pub render_timeout: Duration,
    pub image_timeout: Duration,
    pub image_retry: BackoffConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            design_scheme_model: "label-design-v1".to_string(),
            image_prompts_model: "label-design-v1".to_string(),
            detailed_layout_model: "label-design-v1".to_string(),
            refine_model: "label-vision-v1".to_string(),
            max_image_concurrency: 3,
            max_refine_iterations: 2,
            llm_timeout: Duration::from_secs(30),
            render_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(60),
            image_retry: BackoffConfig::default_image_retry(),
        }
    }
}
