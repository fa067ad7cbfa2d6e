//! Implements `labelforge_store::AssetRepository` over [`PgGateway`], so the
//! orchestrator can hand a `PgGateway`-backed content store to code written
//! only against the store crate's trait.

use async_trait::async_trait;
use labelforge_core::{AssetRecord, LabelResult};
use labelforge_store::AssetRepository;
use uuid::Uuid;

use crate::gateway::PgGateway;

#[async_trait]
impl AssetRepository for PgGateway {
    async fn find_asset(&self, generation_id: Uuid, asset_id: &str) -> LabelResult<Option<AssetRecord>> {
        let row = sqlx::query(
            "SELECT generation_id, asset_id, url, width, height, format, checksum, prompt, model, seed \
             FROM label_assets WHERE generation_id = $1 AND asset_id = $2",
        )
        .bind(generation_id)
        .bind(asset_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| labelforge_core::LabelError::Database(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(crate::gateway::asset_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_asset(&self, record: &AssetRecord) -> LabelResult<()> {
        self.insert_asset_with_metadata(record).await
    }
}
