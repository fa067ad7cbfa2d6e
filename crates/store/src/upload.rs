//! The content-addressable upload algorithm itself (spec §4.4).

use std::sync::Arc;

use labelforge_core::{AssetFormat, AssetRecord};
use tracing::info;
use uuid::Uuid;

use crate::checksum::{sha256_hex, sniff_format_and_dimensions};
use crate::object_store::ObjectStore;
use crate::repository::AssetRepository;
use labelforge_core::LabelResult;

pub struct ContentStore {
    object_store: Arc<dyn ObjectStore>,
    repository: Arc<dyn AssetRepository>,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: AssetFormat,
    pub checksum: String,
}

impl ContentStore {
    pub fn new(object_store: Arc<dyn ObjectStore>, repository: Arc<dyn AssetRepository>) -> Self {
        Self {
            object_store,
            repository,
        }
    }

    /// Implements spec §4.4's six-step algorithm: per-slot idempotence
    /// check, content-addressed write (collision = success), atomic
    /// metadata upsert.
    pub async fn upload(
        &self,
        generation_id: Uuid,
        asset_id: &str,
        bytes: &[u8],
        checksum: Option<String>,
        prompt: &str,
        model: &str,
        seed: Option<i64>,
    ) -> LabelResult<UploadOutcome> {
        let checksum = checksum.unwrap_or_else(|| sha256_hex(bytes));

        if let Some(existing) = self.repository.find_asset(generation_id, asset_id).await? {
            if existing.checksum == checksum {
                info!(
                    generation_id = %generation_id,
                    asset_id,
                    "asset slot already satisfied, skipping re-upload"
                );
                return Ok(UploadOutcome {
                    url: existing.url,
                    width: existing.width,
                    height: existing.height,
                    format: existing.format,
                    checksum: existing.checksum,
                });
            }
        }

        let (format, width, height) = sniff_format_and_dimensions(bytes)?;
        let path = format!("content/{checksum}.{}", format.extension());

        self.object_store.put(&path, bytes).await?;
        let url = self.object_store.public_url(&path);

        let record = AssetRecord {
            generation_id,
            asset_id: asset_id.to_string(),
            url: url.clone(),
            width,
            height,
            format,
            checksum: checksum.clone(),
            prompt: prompt.to_string(),
            model: model.to_string(),
            seed,
        };
        self.repository.upsert_asset(&record).await?;

        Ok(UploadOutcome {
            url,
            width,
            height,
            format,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_store::LocalFsStore;
    use crate::repository::InMemoryAssetRepository;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        let buffer = image::RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]));
        image::DynamicImage::ImageRgb8(buffer)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn store() -> ContentStore {
        let dir = tempfile::tempdir().unwrap();
        let object_store = Arc::new(LocalFsStore::new(
            dir.into_path(),
            "https://cdn.example.com/label-images",
        ));
        let repository = Arc::new(InMemoryAssetRepository::new());
        ContentStore::new(object_store, repository)
    }

    #[tokio::test]
    async fn per_slot_idempotence_returns_same_url_without_second_row() {
        let store = store();
        let generation_id = Uuid::new_v4();
        let bytes = png_bytes();

        let first = store
            .upload(generation_id, "hero", &bytes, None, "a vineyard", "mock-v1", None)
            .await
            .unwrap();
        let second = store
            .upload(generation_id, "hero", &bytes, None, "a vineyard", "mock-v1", None)
            .await
            .unwrap();

        assert_eq!(first.url, second.url);
        assert_eq!(first.checksum, second.checksum);
    }

    #[tokio::test]
    async fn same_content_different_slot_yields_identical_url() {
        let store = store();
        let bytes = png_bytes();

        let first = store
            .upload(Uuid::new_v4(), "hero", &bytes, None, "prompt a", "mock-v1", None)
            .await
            .unwrap();
        let second = store
            .upload(Uuid::new_v4(), "decoration", &bytes, None, "prompt b", "mock-v1", None)
            .await
            .unwrap();

        assert_eq!(first.url, second.url);
        assert!(first.url.ends_with(&format!("content/{}.png", first.checksum)));
    }

    #[tokio::test]
    async fn checksum_matches_sha256_of_bytes() {
        let store = store();
        let bytes = png_bytes();

        let outcome = store
            .upload(Uuid::new_v4(), "hero", &bytes, None, "prompt", "mock-v1", None)
            .await
            .unwrap();

        assert_eq!(outcome.checksum, sha256_hex(&bytes));
    }
}
