//! Stage orchestrator (C8): drives a generation through the six-stage
//! pipeline, persisting via `labelforge-db` and calling out to the C2–C7
//! seams for each stage body.

pub mod config;
pub mod orchestrator;
pub mod retry;
pub mod schemas;
pub mod stages;

pub use config::PipelineConfig;
pub use orchestrator::Orchestrator;
pub use schemas::ImagePromptsResponse;
pub use stages::{RefineOutput, RenderOutcome, StageDeps};
