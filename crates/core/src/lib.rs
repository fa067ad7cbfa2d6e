#![warn(clippy::unwrap_used)]

pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod submission;
pub mod validator;

pub use config::AppConfig;
pub use document::{
    Align, Asset, Bounds, Canvas, Contrast, Element, Fit, Font, FontRef, FontStyle, Hierarchy,
    ImageElement, LabelDocument, Palette, PaletteRole, ProducerEmphasis, RegionDisplay,
    ShapeElement, ShapeKind, TextElement, TextTransform, Temperature, Typography,
    VintageProminence, DOCUMENT_VERSION,
};
pub use error::{ErrorKind, LabelError, LabelResult};
pub use generation::{
    AssetFormat, AssetRecord, Generation, GenerationStatus, GenerationStep, Stage, StepStatus,
};
pub use submission::{Style, Submission, SubmissionRequest};
pub use validator::{validate, validate_design_scheme, validate_detailed_layout, Issue, IssueCode};
