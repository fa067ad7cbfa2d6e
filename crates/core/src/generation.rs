//! Mutable generation-lifecycle rows — spec §3 "Generation",
//! "GenerationStep", and "Asset record". These are the shapes persisted by
//! `labelforge-db` and driven by `labelforge-orchestrator`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::LabelDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// The six ordered pipeline stages (spec §2, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    DesignScheme,
    ImagePrompts,
    ImageGenerate,
    DetailedLayout,
    Render,
    Refine,
}

impl Stage {
    /// Fixed execution order (spec §4.8 step 2).
    pub const ORDER: [Stage; 6] = [
        Stage::DesignScheme,
        Stage::ImagePrompts,
        Stage::ImageGenerate,
        Stage::DetailedLayout,
        Stage::Render,
        Stage::Refine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DesignScheme => "design-scheme",
            Stage::ImagePrompts => "image-prompts",
            Stage::ImageGenerate => "image-generate",
            Stage::DetailedLayout => "detailed-layout",
            Stage::Render => "render",
            Stage::Refine => "refine",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub status: GenerationStatus,
    pub phase: Option<Stage>,
    pub design_scheme: Option<LabelDocument>,
    pub description: Option<LabelDocument>,
    pub preview_url: Option<String>,
    pub preview_width: Option<u32>,
    pub preview_height: Option<u32>,
    pub preview_format: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Generation {
    pub fn new(submission_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission_id,
            status: GenerationStatus::Pending,
            phase: None,
            design_scheme: None,
            description: None,
            preview_url: None,
            preview_width: None,
            preview_height: None,
            preview_format: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One row per `(generation_id, step)` — spec §3 "GenerationStep".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStep {
    pub generation_id: Uuid,
    pub step: Stage,
    pub status: StepStatus,
    pub attempt: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl GenerationStep {
    pub fn new(generation_id: Uuid, step: Stage) -> Self {
        Self {
            generation_id,
            step,
            status: StepStatus::Pending,
            attempt: 0,
            started_at: None,
            completed_at: None,
            input: None,
            output: None,
            error: None,
        }
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Jpg,
    Webp,
}

impl AssetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AssetFormat::Png => "png",
            AssetFormat::Jpg => "jpg",
            AssetFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AssetFormat::Png => "image/png",
            AssetFormat::Jpg => "image/jpeg",
            AssetFormat::Webp => "image/webp",
        }
    }
}

/// One row per `(generation_id, asset_id)` — spec §3 "Asset record".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub generation_id: Uuid,
    pub asset_id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: AssetFormat,
    pub checksum: String,
    pub prompt: String,
    pub model: String,
    pub seed: Option<i64>,
}
