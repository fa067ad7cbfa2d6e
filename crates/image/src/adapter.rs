//! The `ImageAdapter` seam (spec §4.3). Production and mock implementations
//! live in `http.rs` / `mock.rs`; the orchestrator depends only on this
//! trait so stage bodies can run against deterministic test doubles.

use async_trait::async_trait;
use labelforge_core::LabelResult;

use crate::spec::{ImageOutput, ImageSpec};

#[async_trait]
pub trait ImageAdapter: Send + Sync {
    async fn generate(&self, spec: &ImageSpec) -> LabelResult<ImageOutput>;
}
