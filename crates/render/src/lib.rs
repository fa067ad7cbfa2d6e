//! Renderer client (C5): turns a validated `LabelDocument` into PNG bytes.

pub mod client;
pub mod mock;

pub use client::{HttpRendererClient, RenderOptions, RendererClient};
pub use mock::MockRendererClient;
