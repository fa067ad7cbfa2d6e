//! Persistence gateway (C10, spec §4.10): the narrow set of operations the
//! orchestrator and content store are allowed to call. No caller outside
//! this crate touches SQL directly.

use chrono::Utc;
use labelforge_core::{
    AssetRecord, Generation, GenerationStep, LabelDocument, LabelError, LabelResult, Stage,
    StepStatus, Submission,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::codec::{
    format_from_str, format_to_str, stage_from_str, status_from_str, status_to_str,
    step_status_from_str, step_status_to_str, style_from_str, style_to_str,
};

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_submission(&self, submission: &Submission) -> LabelResult<()> {
        sqlx::query(
            "INSERT INTO wine_label_submissions \
             (id, producer_name, wine_name, vintage, variety, region, appellation, style, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(submission.id)
        .bind(&submission.producer_name)
        .bind(&submission.wine_name)
        .bind(&submission.vintage)
        .bind(&submission.variety)
        .bind(&submission.region)
        .bind(&submission.appellation)
        .bind(style_to_str(submission.style))
        .bind(submission.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("insert_submission: {e}")))?;

        Ok(())
    }

    pub async fn insert_generation(&self, generation: &Generation) -> LabelResult<()> {
        sqlx::query(
            "INSERT INTO label_generations \
             (id, submission_id, status, phase, design_scheme, description, \
              preview_url, preview_width, preview_height, preview_format, error, \
              created_at, updated_at, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(generation.id)
        .bind(generation.submission_id)
        .bind(status_to_str(generation.status))
        .bind(generation.phase.map(Stage::as_str))
        .bind(
            generation
                .design_scheme
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(
            generation
                .description
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(&generation.preview_url)
        .bind(generation.preview_width.map(|w| w as i32))
        .bind(generation.preview_height.map(|h| h as i32))
        .bind(&generation.preview_format)
        .bind(&generation.error)
        .bind(generation.created_at)
        .bind(generation.updated_at)
        .bind(generation.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("insert_generation: {e}")))?;

        Ok(())
    }

    /// Full-row replace of the mutable generation fields. Called on every
    /// stage transition (spec §4.8 step 3).
    pub async fn update_generation(&self, generation: &Generation) -> LabelResult<()> {
        let rows = sqlx::query(
            "UPDATE label_generations SET \
             status = $2, phase = $3, design_scheme = $4, description = $5, \
             preview_url = $6, preview_width = $7, preview_height = $8, preview_format = $9, \
             error = $10, updated_at = $11, completed_at = $12 \
             WHERE id = $1",
        )
        .bind(generation.id)
        .bind(status_to_str(generation.status))
        .bind(generation.phase.map(Stage::as_str))
        .bind(
            generation
                .design_scheme
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(
            generation
                .description
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
        )
        .bind(&generation.preview_url)
        .bind(generation.preview_width.map(|w| w as i32))
        .bind(generation.preview_height.map(|h| h as i32))
        .bind(&generation.preview_format)
        .bind(&generation.error)
        .bind(generation.updated_at)
        .bind(generation.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("update_generation: {e}")))?
        .rows_affected();

        if rows == 0 {
            return Err(LabelError::Database(format!(
                "update_generation: no row for generation {}",
                generation.id
            )));
        }

        Ok(())
    }

    pub async fn find_generation(&self, id: Uuid) -> LabelResult<Option<Generation>> {
        let row = sqlx::query(
            "SELECT id, submission_id, status, phase, design_scheme, description, \
             preview_url, preview_width, preview_height, preview_format, error, \
             created_at, updated_at, completed_at \
             FROM label_generations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("find_generation: {e}")))?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(generation_from_row(&row)?))
    }

    /// Upserts a step row keyed on `(generation_id, step)`. A unique
    /// violation on first insert means a concurrent worker already created
    /// the row — spec §4.10 treats that as "row exists, proceed with
    /// update" rather than an error.
    pub async fn upsert_step(&self, step: &GenerationStep) -> LabelResult<()> {
        let insert = sqlx::query(
            "INSERT INTO label_generation_steps \
             (generation_id, step, status, attempt, started_at, completed_at, input, output, error) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(step.generation_id)
        .bind(step.step.as_str())
        .bind(step_status_to_str(step.status))
        .bind(step.attempt as i32)
        .bind(step.started_at)
        .bind(step.completed_at)
        .bind(step.input.clone())
        .bind(step.output.clone())
        .bind(&step.error)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => self.update_step(step).await,
            Err(e) => Err(LabelError::Database(format!("upsert_step: {e}"))),
        }
    }

    async fn update_step(&self, step: &GenerationStep) -> LabelResult<()> {
        sqlx::query(
            "UPDATE label_generation_steps SET \
             status = $3, attempt = $4, started_at = $5, completed_at = $6, \
             input = $7, output = $8, error = $9 \
             WHERE generation_id = $1 AND step = $2",
        )
        .bind(step.generation_id)
        .bind(step.step.as_str())
        .bind(step_status_to_str(step.status))
        .bind(step.attempt as i32)
        .bind(step.started_at)
        .bind(step.completed_at)
        .bind(step.input.clone())
        .bind(step.output.clone())
        .bind(&step.error)
        .execute(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("update_step: {e}")))?;

        Ok(())
    }

    pub async fn find_step(&self, generation_id: Uuid, step: Stage) -> LabelResult<Option<GenerationStep>> {
        let row = sqlx::query(
            "SELECT generation_id, step, status, attempt, started_at, completed_at, input, output, error \
             FROM label_generation_steps WHERE generation_id = $1 AND step = $2",
        )
        .bind(generation_id)
        .bind(step.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("find_step: {e}")))?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(step_from_row(&row)?))
    }

    /// Atomically claims a step for processing: increments `attempt`, sets
    /// `status = processing`, `started_at = now`, clears `error`. Returns
    /// the row as it stood *after* the claim, so a caller racing another
    /// worker can tell whether it actually won the claim by comparing the
    /// returned `attempt` against the one it expected to set (spec §5,
    /// "claim/attempt-counter idempotence").
    pub async fn claim_step(&self, generation_id: Uuid, step: Stage) -> LabelResult<GenerationStep> {
        let now = Utc::now();
        let row = sqlx::query(
            "UPDATE label_generation_steps SET \
             status = 'processing', attempt = attempt + 1, started_at = $3, error = NULL \
             WHERE generation_id = $1 AND step = $2 \
             RETURNING generation_id, step, status, attempt, started_at, completed_at, input, output, error",
        )
        .bind(generation_id)
        .bind(step.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("claim_step: {e}")))?;

        match row {
            Some(row) => step_from_row(&row),
            None => {
                let fresh = GenerationStep {
                    status: StepStatus::Processing,
                    attempt: 1,
                    started_at: Some(now),
                    ..GenerationStep::new(generation_id, step)
                };
                self.upsert_step(&fresh).await?;
                Ok(fresh)
            }
        }
    }

    /// Upserts an asset row keyed on `(generation_id, asset_id)`. A unique
    /// violation means a concurrent attempt already wrote this slot; that
    /// is treated as idempotent success rather than an error (spec §4.4
    /// step 5, §4.10).
    pub async fn insert_asset_with_metadata(&self, record: &AssetRecord) -> LabelResult<()> {
        let insert = sqlx::query(
            "INSERT INTO label_assets \
             (generation_id, asset_id, url, width, height, format, checksum, prompt, model, seed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.generation_id)
        .bind(&record.asset_id)
        .bind(&record.url)
        .bind(record.width as i32)
        .bind(record.height as i32)
        .bind(format_to_str(record.format))
        .bind(&record.checksum)
        .bind(&record.prompt)
        .bind(&record.model)
        .bind(record.seed)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                sqlx::query(
                    "UPDATE label_assets SET url = $3, width = $4, height = $5, format = $6, \
                     checksum = $7, prompt = $8, model = $9, seed = $10 \
                     WHERE generation_id = $1 AND asset_id = $2",
                )
                .bind(record.generation_id)
                .bind(&record.asset_id)
                .bind(&record.url)
                .bind(record.width as i32)
                .bind(record.height as i32)
                .bind(format_to_str(record.format))
                .bind(&record.checksum)
                .bind(&record.prompt)
                .bind(&record.model)
                .bind(record.seed)
                .execute(&self.pool)
                .await
                .map_err(|e| LabelError::Database(format!("insert_asset_with_metadata update: {e}")))?;
                Ok(())
            }
            Err(e) => Err(LabelError::Database(format!("insert_asset_with_metadata: {e}"))),
        }
    }

    pub async fn find_asset_by_checksum(&self, checksum: &str) -> LabelResult<Option<AssetRecord>> {
        let row = sqlx::query(
            "SELECT generation_id, asset_id, url, width, height, format, checksum, prompt, model, seed \
             FROM label_assets WHERE checksum = $1 LIMIT 1",
        )
        .bind(checksum)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LabelError::Database(format!("find_asset_by_checksum: {e}")))?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(asset_from_row(&row)?))
    }
}

fn generation_from_row(row: &sqlx::postgres::PgRow) -> LabelResult<Generation> {
    let status_str: String = row.try_get("status").map_err(db_err)?;
    let phase_str: Option<String> = row.try_get("phase").map_err(db_err)?;
    let design_scheme: Option<serde_json::Value> = row.try_get("design_scheme").map_err(db_err)?;
    let description: Option<serde_json::Value> = row.try_get("description").map_err(db_err)?;

    Ok(Generation {
        id: row.try_get("id").map_err(db_err)?,
        submission_id: row.try_get("submission_id").map_err(db_err)?,
        status: status_from_str(&status_str)?,
        phase: phase_str.map(|s| stage_from_str(&s)).transpose()?,
        design_scheme: design_scheme
            .map(serde_json::from_value::<LabelDocument>)
            .transpose()?,
        description: description
            .map(serde_json::from_value::<LabelDocument>)
            .transpose()?,
        preview_url: row.try_get("preview_url").map_err(db_err)?,
        preview_width: row
            .try_get::<Option<i32>, _>("preview_width")
            .map_err(db_err)?
            .map(|w| w as u32),
        preview_height: row
            .try_get::<Option<i32>, _>("preview_height")
            .map_err(db_err)?
            .map(|h| h as u32),
        preview_format: row.try_get("preview_format").map_err(db_err)?,
        error: row.try_get("error").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
        completed_at: row.try_get("completed_at").map_err(db_err)?,
    })
}

fn step_from_row(row: &sqlx::postgres::PgRow) -> LabelResult<GenerationStep> {
    let step_str: String = row.try_get("step").map_err(db_err)?;
    let status_str: String = row.try_get("status").map_err(db_err)?;

    Ok(GenerationStep {
        generation_id: row.try_get("generation_id").map_err(db_err)?,
        step: stage_from_str(&step_str)?,
        status: step_status_from_str(&status_str)?,
        attempt: row.try_get::<i32, _>("attempt").map_err(db_err)? as u32,
        started_at: row.try_get("started_at").map_err(db_err)?,
        completed_at: row.try_get("completed_at").map_err(db_err)?,
        input: row.try_get("input").map_err(db_err)?,
        output: row.try_get("output").map_err(db_err)?,
        error: row.try_get("error").map_err(db_err)?,
    })
}

pub(crate) fn asset_from_row(row: &sqlx::postgres::PgRow) -> LabelResult<AssetRecord> {
    let format_str: String = row.try_get("format").map_err(db_err)?;

    Ok(AssetRecord {
        generation_id: row.try_get("generation_id").map_err(db_err)?,
        asset_id: row.try_get("asset_id").map_err(db_err)?,
        url: row.try_get("url").map_err(db_err)?,
        width: row.try_get::<i32, _>("width").map_err(db_err)? as u32,
        height: row.try_get::<i32, _>("height").map_err(db_err)? as u32,
        format: format_from_str(&format_str)?,
        checksum: row.try_get("checksum").map_err(db_err)?,
        prompt: row.try_get("prompt").map_err(db_err)?,
        model: row.try_get("model").map_err(db_err)?,
        seed: row.try_get("seed").map_err(db_err)?,
    })
}

fn submission_from_row(row: &sqlx::postgres::PgRow) -> LabelResult<Submission> {
    let style_str: String = row.try_get("style").map_err(db_err)?;

    Ok(Submission {
        id: row.try_get("id").map_err(db_err)?,
        producer_name: row.try_get("producer_name").map_err(db_err)?,
        wine_name: row.try_get("wine_name").map_err(db_err)?,
        vintage: row.try_get("vintage").map_err(db_err)?,
        variety: row.try_get("variety").map_err(db_err)?,
        region: row.try_get("region").map_err(db_err)?,
        appellation: row.try_get("appellation").map_err(db_err)?,
        style: style_from_str(&style_str)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn db_err(e: sqlx::Error) -> LabelError {
    LabelError::Database(e.to_string())
}

impl PgGateway {
    pub async fn find_submission(&self, id: Uuid) -> LabelResult<Option<Submission>> {
        let row = sqlx::query(
            "SELECT id, producer_name, wine_name, vintage, variety, region, appellation, style, created_at \
             FROM wine_label_submissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(submission_from_row(&row)?))
    }
}
