//! Content-addressable asset store (C4): checksum, decode, dedup, upsert.

pub mod checksum;
pub mod object_store;
pub mod repository;
pub mod upload;

pub use checksum::{sha256_hex, sniff_format_and_dimensions};
pub use object_store::{LocalFsStore, ObjectStore, S3CompatibleStore};
pub use repository::{AssetRepository, InMemoryAssetRepository};
pub use upload::{ContentStore, UploadOutcome};
