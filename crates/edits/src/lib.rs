//! Edit mapper/validator (C7): resolves the vision refiner's semantic
//! element ids onto real document ids, translates loosely-typed edit
//! values, validates and clamps, and applies to produce a new document.

pub mod algebra;
pub mod apply;
pub mod mapper;
pub mod resolve;
pub mod translate;
pub mod validate;

pub use algebra::{ClampedEdit, FailedEdit, InternalEdit};
pub use apply::{apply, apply_document_edits, ApplyResult};
pub use mapper::{map_document_edits, map_operation, PaletteEdit};
pub use resolve::resolve_element_id;
pub use validate::{validate_edits, ValidationOutcome, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS};
