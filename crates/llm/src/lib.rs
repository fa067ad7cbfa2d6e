//! Structured-LLM harness (C2): the seam between prompt templates and
//! typed Rust values used by every text-generation pipeline stage.

pub mod client;
pub mod extract;
pub mod harness;
pub mod template;

pub use client::{HttpLlmClient, LlmClient, MockLlmClient, MockResponse};
pub use extract::extract_json;
pub use harness::{StructuredLlmHarness, MAX_REPAIR_RETRIES};
pub use template::render;
