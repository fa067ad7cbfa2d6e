//! The storage seam underneath C4 (spec §4.4 step 4, §6 "Storage layout").
//! Objects are immutable once written: a write to a path that already
//! holds identical content is a no-op success, never an error.

use async_trait::async_trait;
use labelforge_core::LabelResult;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `bytes` at `path` if absent. A collision at `path` is treated
    /// as success since the path is content-addressed.
    async fn put(&self, path: &str, bytes: &[u8]) -> LabelResult<()>;

    async fn exists(&self, path: &str) -> LabelResult<bool>;

    /// The publicly reachable, cache-immutable URL for `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Local-filesystem store, the default for tests and development.
pub struct LocalFsStore {
    root: std::path::PathBuf,
    public_base_url: String,
}

impl LocalFsStore {
    pub fn new(root: impl Into<std::path::PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalFsStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> LabelResult<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::try_exists(&full_path).await? {
            return Ok(());
        }
        tokio::fs::write(&full_path, bytes).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> LabelResult<bool> {
        Ok(tokio::fs::try_exists(self.root.join(path)).await?)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.public_base_url.trim_end_matches('/'))
    }
}

/// S3-compatible store using a plain PUT request, for deployments backed by
/// an object store reachable over HTTP (spec §6 bucket `label-images`).
pub struct S3CompatibleStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_base_url: String,
}

impl S3CompatibleStore {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3CompatibleStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> LabelResult<()> {
        if self.exists(path).await? {
            return Ok(());
        }

        let url = format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, path);
        let response = self
            .http
            .put(url)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| labelforge_core::LabelError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(labelforge_core::LabelError::Storage(format!(
                "object store rejected PUT: {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> LabelResult<bool> {
        let url = format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), self.bucket, path);
        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| labelforge_core::LabelError::Storage(e.to_string()))?;
        Ok(response.status().is_success())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{path}", self.public_base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_store_writes_then_is_idempotent_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path(), "https://cdn.example.com/label-images");

        store.put("content/abc.png", b"hello").await.unwrap();
        assert!(store.exists("content/abc.png").await.unwrap());

        // Writing the same path again (content collision) must not error.
        store.put("content/abc.png", b"hello").await.unwrap();

        assert_eq!(
            store.public_url("content/abc.png"),
            "https://cdn.example.com/label-images/content/abc.png"
        );
    }
}
