//! Per-logical-slot lookup seam (spec §4.4 step 3). Implemented by
//! `labelforge-db`; kept here rather than the other way around so this
//! crate never depends on the persistence crate.

use async_trait::async_trait;
use labelforge_core::{AssetRecord, LabelResult};
use uuid::Uuid;

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn find_asset(&self, generation_id: Uuid, asset_id: &str) -> LabelResult<Option<AssetRecord>>;

    /// Atomic upsert keyed on `(generation_id, asset_id)` — no partially
    /// written row is ever visible (spec §4.4 step 5).
    async fn upsert_asset(&self, record: &AssetRecord) -> LabelResult<()>;
}

/// In-memory `AssetRepository` for tests, mirroring the content-hash
/// dedup table pattern used elsewhere in this codebase for asset ingestion.
pub struct InMemoryAssetRepository {
    records: parking_lot::Mutex<std::collections::HashMap<(Uuid, String), AssetRecord>>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self {
            records: parking_lot::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryAssetRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn find_asset(&self, generation_id: Uuid, asset_id: &str) -> LabelResult<Option<AssetRecord>> {
        Ok(self
            .records
            .lock()
            .get(&(generation_id, asset_id.to_string()))
            .cloned())
    }

    async fn upsert_asset(&self, record: &AssetRecord) -> LabelResult<()> {
        self.records
            .lock()
            .insert((record.generation_id, record.asset_id.clone()), record.clone());
        Ok(())
    }
}
