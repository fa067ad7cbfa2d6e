//! Submission and status endpoints (spec §6 "External Interfaces").

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use labelforge_core::{Generation, LabelDocument, Stage, SubmissionRequest};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub submission_id: Uuid,
    pub generation_id: Uuid,
    pub status_url: String,
}

/// POST submission endpoint: persists the submission, creates a pending
/// generation, and dispatches C8 fire-and-forget (dev-mode loopback per
/// spec §4.9 — no queue between C9 and C8 in this deployment shape).
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    request.validate().map_err(ApiError::from)?;

    let now = Utc::now();
    let submission = request.into_submission(Uuid::new_v4(), now);
    state.db.insert_submission(&submission).await?;

    let generation = Generation::new(submission.id, now);
    state.db.insert_generation(&generation).await?;

    let generation_id = generation.id;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(err) = orchestrator.run(generation_id).await {
            error!(generation_id = %generation_id, error = %err, "generation run failed");
        }
    });

    info!(submission_id = %submission.id, generation_id = %generation_id, "submission accepted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            submission_id: submission.id,
            generation_id,
            status_url: format!("/generations/{generation_id}"),
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusResponse {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_scheme: Option<LabelDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LabelDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Generation> for GenerationStatusResponse {
    fn from(g: Generation) -> Self {
        Self {
            id: g.id,
            submission_id: g.submission_id,
            status: format!("{:?}", g.status).to_lowercase(),
            phase: g.phase,
            design_scheme: g.design_scheme,
            description: g.description,
            preview_url: g.preview_url,
            error: g.error,
            created_at: g.created_at,
            updated_at: g.updated_at,
            completed_at: g.completed_at,
        }
    }
}

/// GET status endpoint: `404` with `GENERATION_NOT_FOUND` for an unknown id.
pub async fn status(
    State(state): State<AppState>,
    Path(generation_id): Path<Uuid>,
) -> Result<Json<GenerationStatusResponse>, ApiError> {
    let generation = state
        .db
        .find_generation(generation_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown generation {generation_id}")))?;

    Ok(Json(generation.into()))
}
