//! Vision refiner (C6): proposes bounded visual edits to a rendered
//! preview, schema-constrained via the structured-LLM harness.

pub mod operations;
pub mod refiner;

pub use operations::{
    ElementProperty, EditOperation, ProposeEditsResponse, TypographyProperty, TypographyTarget,
};
pub use refiner::{LlmVisionRefiner, MockVisionRefiner, SharedVisionRefiner, VisionRefiner};
