//! Image generation adapter (C3): turns an `ImageSpec` into raw bytes plus
//! metadata, with production and mock implementations behind one trait.

pub mod adapter;
pub mod http;
pub mod mock;
pub mod spec;

pub use adapter::ImageAdapter;
pub use http::HttpImageAdapter;
pub use mock::MockImageAdapter;
pub use spec::{Aspect, ImageMeta, ImageOutput, ImageSpec, Purpose};
