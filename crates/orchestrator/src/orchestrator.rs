//! Stage orchestrator (C8, spec §4.8): the finite-state machine driving a
//! single generation through its six stages, persisting input/output at
//! every transition so a re-invocation resumes from the first
//! non-completed step.

use std::sync::Arc;

use chrono::Utc;
use labelforge_core::{
    AssetRecord, Generation, GenerationStatus, GenerationStep, LabelDocument, LabelError,
    LabelResult, Stage, StepStatus, Submission,
};
use labelforge_db::PgGateway;
use tracing::{error, info};
use uuid::Uuid;

use crate::schemas::ImagePromptsResponse;
use crate::stages::{
    run_design_scheme, run_detailed_layout, run_image_generate, run_image_prompts,
    run_refine_stage, run_render, RefineOutput, RenderOutcome, StageDeps,
};

pub struct Orchestrator {
    db: Arc<PgGateway>,
    deps: StageDeps,
}

/// Typed carry-over between stages, decoded from the prior stage's
/// persisted `output` JSON on resume rather than recomputed.
#[derive(Default)]
struct PipelineState {
    design_scheme: Option<LabelDocument>,
    prompts: Option<ImagePromptsResponse>,
    assets: Option<Vec<AssetRecord>>,
    layout: Option<LabelDocument>,
    render_outcome: Option<RenderOutcome>,
    refine: Option<RefineOutput>,
}

impl PipelineState {
    fn hydrate(&mut self, stage: Stage, output: &serde_json::Value) -> LabelResult<()> {
        match stage {
            Stage::DesignScheme => self.design_scheme = Some(serde_json::from_value(output.clone())?),
            Stage::ImagePrompts => self.prompts = Some(serde_json::from_value(output.clone())?),
            Stage::ImageGenerate => self.assets = Some(serde_json::from_value(output.clone())?),
            Stage::DetailedLayout => self.layout = Some(serde_json::from_value(output.clone())?),
            Stage::Render => self.render_outcome = Some(serde_json::from_value(output.clone())?),
            Stage::Refine => self.refine = Some(serde_json::from_value(output.clone())?),
        }
        Ok(())
    }

    fn require_design_scheme(&self) -> LabelResult<&LabelDocument> {
        self.design_scheme
            .as_ref()
            .ok_or_else(|| missing_predecessor("design-scheme"))
    }

    fn require_prompts(&self) -> LabelResult<&ImagePromptsResponse> {
        self.prompts.as_ref().ok_or_else(|| missing_predecessor("image-prompts"))
    }

    fn require_assets(&self) -> LabelResult<&[AssetRecord]> {
        self.assets
            .as_deref()
            .ok_or_else(|| missing_predecessor("image-generate"))
    }

    fn require_layout(&self) -> LabelResult<&LabelDocument> {
        self.layout.as_ref().ok_or_else(|| missing_predecessor("detailed-layout"))
    }

    fn require_render(&self) -> LabelResult<&RenderOutcome> {
        self.render_outcome.as_ref().ok_or_else(|| missing_predecessor("render"))
    }
}

fn missing_predecessor(stage: &str) -> LabelError {
    LabelError::StageFailed {
        stage: stage.to_string(),
        reason: "predecessor stage output missing from persisted state".to_string(),
    }
}

impl Orchestrator {
    pub fn new(db: Arc<PgGateway>, deps: StageDeps) -> Self {
        Self { db, deps }
    }

    /// Runs (or resumes) a generation to completion. Idempotent: invoking
    /// twice with the same generation id produces the same final document
    /// and the same set of step rows (spec §8).
    pub async fn run(&self, generation_id: Uuid) -> LabelResult<Generation> {
        let mut generation = self
            .db
            .find_generation(generation_id)
            .await?
            .ok_or_else(|| LabelError::Database(format!("unknown generation {generation_id}")))?;

        if matches!(
            generation.status,
            GenerationStatus::Completed | GenerationStatus::Failed
        ) {
            return Ok(generation);
        }

        let submission = self
            .db
            .find_submission(generation.submission_id)
            .await?
            .ok_or_else(|| {
                LabelError::Database(format!("unknown submission {}", generation.submission_id))
            })?;

        if generation.status == GenerationStatus::Pending {
            generation.status = GenerationStatus::Processing;
            generation.updated_at = Utc::now();
            self.db.update_generation(&generation).await?;
        }

        let mut state = PipelineState::default();

        for stage in Stage::ORDER {
            let existing = self.db.find_step(generation_id, stage).await?;

            if let Some(step) = &existing {
                if step.status == StepStatus::Completed {
                    if let Some(output) = &step.output {
                        state.hydrate(stage, output)?;
                    }
                    generation.phase = Some(stage);
                    continue;
                }
            }

            if existing.is_none() {
                self.db
                    .upsert_step(&GenerationStep::new(generation_id, stage))
                    .await?;
            }

            let claimed = self.db.claim_step(generation_id, stage).await?;
            generation.phase = Some(stage);
            generation.updated_at = Utc::now();
            self.db.update_generation(&generation).await?;

            info!(generation_id = %generation_id, stage = stage.as_str(), attempt = claimed.attempt, "executing stage");

            match self.execute_stage(stage, generation_id, &submission, &state).await {
                Ok(output_json) => {
                    state.hydrate(stage, &output_json)?;

                    let mut completed = claimed;
                    completed.status = StepStatus::Completed;
                    completed.output = Some(output_json);
                    completed.completed_at = Some(Utc::now());
                    self.db.upsert_step(&completed).await?;
                }
                Err(err) => {
                    error!(generation_id = %generation_id, stage = stage.as_str(), error = %err, "stage failed");

                    let mut failed = claimed;
                    failed.status = StepStatus::Failed;
                    failed.error = Some(err.to_string());
                    failed.completed_at = Some(Utc::now());
                    self.db.upsert_step(&failed).await?;

                    generation.status = GenerationStatus::Failed;
                    generation.error = Some(format!("{}: {err}", stage.as_str()));
                    generation.updated_at = Utc::now();
                    self.db.update_generation(&generation).await?;
                    return Err(err);
                }
            }
        }

        generation.status = GenerationStatus::Completed;
        generation.description = state.refine.map(|r| r.document);
        generation.completed_at = Some(Utc::now());
        generation.updated_at = Utc::now();
        self.db.update_generation(&generation).await?;

        Ok(generation)
    }

    async fn execute_stage(
        &self,
        stage: Stage,
        generation_id: Uuid,
        submission: &Submission,
        state: &PipelineState,
    ) -> LabelResult<serde_json::Value> {
        let output = match stage {
            Stage::DesignScheme => {
                let doc = run_design_scheme(&self.deps, submission).await?;
                serde_json::to_value(&doc)?
            }
            Stage::ImagePrompts => {
                let design_scheme = state.require_design_scheme()?;
                let response = run_image_prompts(&self.deps, submission, design_scheme).await?;
                serde_json::to_value(&response)?
            }
            Stage::ImageGenerate => {
                let prompts = state.require_prompts()?;
                let deduped = prompts.deduped_prompts();
                let assets = run_image_generate(&self.deps, generation_id, deduped).await?;
                serde_json::to_value(&assets)?
            }
            Stage::DetailedLayout => {
                let design_scheme = state.require_design_scheme()?;
                let assets = state.require_assets()?;
                let doc = run_detailed_layout(&self.deps, submission, design_scheme, assets).await?;
                serde_json::to_value(&doc)?
            }
            Stage::Render => {
                let layout = state.require_layout()?;
                let outcome = run_render(&self.deps, generation_id, layout).await?;
                serde_json::to_value(&outcome)?
            }
            Stage::Refine => {
                let layout = state.require_layout()?;
                let render = state.require_render()?;
                let refined = run_refine_stage(&self.deps, generation_id, submission, layout, render).await?;
                serde_json::to_value(&refined)?
            }
        };

        Ok(output)
    }
}
