//! Stage bodies (spec §4.8). Each function is a pure async operation over
//! its inputs — the orchestrator driver owns persistence and sequencing.

use std::collections::HashMap;
use std::sync::Arc;

use labelforge_core::{LabelDocument, LabelResult, Style, Submission};
use labelforge_image::ImageAdapter;
use labelforge_llm::StructuredLlmHarness;
use labelforge_render::{RendererClient, RenderOptions};
use labelforge_store::ContentStore;
use labelforge_vision::VisionRefiner;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::retry::with_retry;
use crate::schemas::ImagePromptsResponse;

pub struct StageDeps {
    pub harness: StructuredLlmHarness,
    pub image_adapter: Arc<dyn ImageAdapter>,
    pub content_store: Arc<ContentStore>,
    pub renderer: Arc<dyn RendererClient>,
    pub vision_refiner: Arc<dyn VisionRefiner>,
    pub config: PipelineConfig,
}

fn style_str(style: Style) -> &'static str {
    match style {
        Style::Classic => "classic",
        Style::Modern => "modern",
        Style::Elegant => "elegant",
        Style::Funky => "funky",
    }
}

fn submission_vars(submission: &Submission) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("producer_name".to_string(), submission.producer_name.clone());
    vars.insert("wine_name".to_string(), submission.wine_name.clone());
    vars.insert("vintage".to_string(), submission.vintage.clone());
    vars.insert("variety".to_string(), submission.variety.clone());
    vars.insert("region".to_string(), submission.region.clone());
    vars.insert("appellation".to_string(), submission.appellation.clone());
    vars.insert("style".to_string(), style_str(submission.style).to_string());
    vars
}

const DESIGN_SCHEME_PROMPT: &str = r#"Design the canvas, color palette, and typography scheme for a wine label.

Wine: {wine_name} by {producer_name}, {vintage} {variety} from {region}, {appellation}.
Style: {style}.

Respond with JSON matching the label document schema (version, canvas, palette,
typography), with `assets` and `elements` left as empty arrays — this stage
only establishes the visual scheme, not the layout."#;

pub async fn run_design_scheme(deps: &StageDeps, submission: &Submission) -> LabelResult<LabelDocument> {
    let vars = submission_vars(submission);

    deps.harness
        .invoke_structured(
            "design-scheme",
            &deps.config.design_scheme_model,
            DESIGN_SCHEME_PROMPT,
            &vars,
            || Ok(()),
            |doc: &LabelDocument| {
                labelforge_core::validate_design_scheme(doc).map_err(|issues| {
                    issues.into_iter().map(|i| format!("{:?}", i)).collect()
                })
            },
        )
        .await
}

const IMAGE_PROMPTS_PROMPT: &str = r#"Given the design scheme below for a wine label, propose up to 5 image
generation prompts needed to realize it (e.g. background texture, vineyard
photo, decorative motif).

Wine: {wine_name} by {producer_name}, {vintage} {variety} from {region}, {appellation}.
Style: {style}.

Design scheme (JSON):
{design_scheme_json}

Respond with JSON: {{"expectedPrompts": N, "prompts": [{{"id", "purpose", "prompt", "aspect", ...}}]}}.
`expectedPrompts` must equal the length of `prompts`."#;

pub async fn run_image_prompts(
    deps: &StageDeps,
    submission: &Submission,
    design_scheme: &LabelDocument,
) -> LabelResult<ImagePromptsResponse> {
    let mut vars = submission_vars(submission);
    vars.insert("design_scheme_json".to_string(), serde_json::to_string(design_scheme)?);

    deps.harness
        .invoke_structured(
            "image-prompts",
            &deps.config.image_prompts_model,
            IMAGE_PROMPTS_PROMPT,
            &vars,
            || Ok(()),
            |response: &ImagePromptsResponse| response.validate_shape(),
        )
        .await
}

/// Generates and uploads one asset per prompt, in bounded concurrent
/// batches (default max concurrency 3), preserving input order in the
/// output regardless of completion order (spec §5 "Ordering guarantees").
/// The stage succeeds iff every prompt yielded an asset record; individual
/// failures are logged and counted but do not abort sibling work.
pub async fn run_image_generate(
    deps: &StageDeps,
    generation_id: Uuid,
    prompts: Vec<labelforge_image::ImageSpec>,
) -> LabelResult<Vec<labelforge_core::AssetRecord>> {
    use tokio::sync::Semaphore;

    let semaphore = Arc::new(Semaphore::new(deps.config.max_image_concurrency));
    let mut handles = Vec::with_capacity(prompts.len());

    for prompt in prompts {
        let semaphore = Arc::clone(&semaphore);
        let image_adapter = Arc::clone(&deps.image_adapter);
        let content_store = Arc::clone(&deps.content_store);
        let retry_cfg = deps.config.image_retry;
        let timeout = deps.config.image_timeout;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let prompt_text = prompt.prompt.clone();
            let asset_id = prompt.id.clone();

            let result = crate::retry::with_timeout(
                "image-generate",
                timeout,
                with_retry(&retry_cfg, || {
                    let adapter = Arc::clone(&image_adapter);
                    let spec = prompt.clone();
                    async move { adapter.generate(&spec).await }
                }),
            )
            .await;

            let output = result?;
            content_store
                .upload(
                    generation_id,
                    &asset_id,
                    &output.bytes,
                    None,
                    &prompt_text,
                    &output.meta.model,
                    output.meta.seed.map(|s| s as i64),
                )
                .await
                .map(|outcome| labelforge_core::AssetRecord {
                    generation_id,
                    asset_id,
                    url: outcome.url,
                    width: outcome.width,
                    height: outcome.height,
                    format: outcome.format,
                    checksum: outcome.checksum,
                    prompt: prompt_text,
                    model: output.meta.model,
                    seed: output.meta.seed.map(|s| s as i64),
                })
        }));
    }

    let mut records = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(record)) => records.push(record),
            Ok(Err(e)) => failures.push(e.to_string()),
            Err(join_err) => failures.push(join_err.to_string()),
        }
    }

    if !failures.is_empty() {
        warn!(failures = failures.len(), "image-generate had partial failures");
        return Err(labelforge_core::LabelError::StageFailed {
            stage: "image-generate".to_string(),
            reason: format!("{}/{} prompts failed: {}", failures.len(), records.len() + failures.len(), failures.join("; ")),
        });
    }

    info!(count = records.len(), "image-generate completed");
    Ok(records)
}

const DETAILED_LAYOUT_PROMPT: &str = r#"Populate the full element layout for this wine label, referencing the
generated image assets below. Every asset must be referenced by exactly one
image element; every image element's assetId must resolve to one of these
assets.

Wine: {wine_name} by {producer_name}, {vintage} {variety} from {region}, {appellation}.
Style: {style}.

Design scheme (JSON):
{design_scheme_json}

Generated assets (JSON):
{assets_json}

Respond with the complete label document JSON (version, canvas, palette,
typography, assets, elements) with elements fully populated."#;

pub async fn run_detailed_layout(
    deps: &StageDeps,
    submission: &Submission,
    design_scheme: &LabelDocument,
    assets: &[labelforge_core::AssetRecord],
) -> LabelResult<LabelDocument> {
    let mut vars = submission_vars(submission);
    vars.insert("design_scheme_json".to_string(), serde_json::to_string(design_scheme)?);
    vars.insert("assets_json".to_string(), serde_json::to_string(assets)?);

    let required_min_assets = assets.len();
    deps.harness
        .invoke_structured(
            "detailed-layout",
            &deps.config.detailed_layout_model,
            DETAILED_LAYOUT_PROMPT,
            &vars,
            || Ok(()),
            |doc: &LabelDocument| {
                labelforge_core::validate_detailed_layout(doc, required_min_assets)
                    .map_err(|issues| issues.into_iter().map(|i| format!("{:?}", i)).collect())
            },
        )
        .await
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    pub preview_url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Renders the document, then uploads the PNG through C4 with a synthetic
/// asset id to obtain a public preview URL (spec §4.8 "render").
pub async fn run_render(
    deps: &StageDeps,
    generation_id: Uuid,
    document: &LabelDocument,
) -> LabelResult<RenderOutcome> {
    let options = RenderOptions {
        debug: false,
        timeout_ms: deps.config.render_timeout.as_millis() as u64,
    };

    let bytes = crate::retry::with_timeout(
        "render",
        deps.config.render_timeout,
        deps.renderer.render(document, options),
    )
    .await?;

    let outcome = deps
        .content_store
        .upload(generation_id, "preview", &bytes, None, "rendered preview", "renderer", None)
        .await?;

    Ok(RenderOutcome {
        preview_url: outcome.url,
        width: outcome.width,
        height: outcome.height,
        format: outcome.format.mime_type().to_string(),
    })
}

/// One refine iteration: C6 proposes edits, C7 maps/validates/applies them,
/// C5 re-renders, C4 re-uploads. Returns the updated document and how many
/// operations were proposed (the driver uses this to decide early exit).
pub async fn run_refine_iteration(
    deps: &StageDeps,
    generation_id: Uuid,
    submission: &Submission,
    document: &LabelDocument,
    preview_url: &str,
) -> LabelResult<(LabelDocument, RenderOutcome, usize)> {
    let proposal = crate::retry::with_timeout(
        "refine",
        deps.config.llm_timeout,
        deps.vision_refiner.propose_edits(submission, document, preview_url),
    )
    .await?;

    let proposed_count = proposal.operations.len();
    if proposed_count == 0 {
        let outcome = run_render(deps, generation_id, document).await?;
        return Ok((document.clone(), outcome, 0));
    }

    let element_edits: Vec<labelforge_edits::InternalEdit> = proposal
        .operations
        .iter()
        .flat_map(|op| labelforge_edits::map_operation(document, op))
        .collect();
    let palette_edits = labelforge_edits::map_document_edits(document, &proposal.operations);

    let validated = labelforge_edits::validate_edits(
        document,
        element_edits,
        labelforge_edits::DEFAULT_MAX_DELTA,
        labelforge_edits::DEFAULT_MAX_EDITS,
    );
    if !validated.rejected.is_empty() {
        info!(rejected = validated.rejected.len(), "refine iteration rejected some edits");
    }

    let apply_result = labelforge_edits::apply(document, validated.accepted);
    let updated = labelforge_edits::apply_document_edits(apply_result.updated_doc, &palette_edits);

    let outcome = run_render(deps, generation_id, &updated).await?;
    Ok((updated, outcome, proposed_count))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineOutput {
    pub document: LabelDocument,
    pub render: RenderOutcome,
    pub iterations_run: u32,
}

/// Drives up to `maxIterations` refine rounds, exiting early the first
/// time an iteration proposes zero operations (spec §4.8 "refine").
pub async fn run_refine_stage(
    deps: &StageDeps,
    generation_id: Uuid,
    submission: &Submission,
    layout: &LabelDocument,
    initial_render: &RenderOutcome,
) -> LabelResult<RefineOutput> {
    let mut document = layout.clone();
    let mut render = initial_render.clone();
    let mut iterations_run = 0;

    for _ in 0..deps.config.max_refine_iterations {
        let (updated_doc, updated_render, proposed_count) =
            run_refine_iteration(deps, generation_id, submission, &document, &render.preview_url).await?;
        iterations_run += 1;
        document = updated_doc;
        render = updated_render;

        if proposed_count == 0 {
            break;
        }
    }

    Ok(RefineOutput {
        document,
        render,
        iterations_run,
    })
}
