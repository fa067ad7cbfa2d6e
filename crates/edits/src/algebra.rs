//! The internal, post-mapping edit algebra (spec §4.7) — the closed set of
//! primitive operations `apply()` executes against an actual document,
//! covering every `update_element` property plus the two structural
//! operations (spec §4.6's full edit vocabulary).

use labelforge_core::Element;

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEdit {
    Move { id: String, dx: f64, dy: f64 },
    Resize { id: String, dw: f64, dh: f64 },
    Recolor { id: String, role: labelforge_core::PaletteRole },
    Reorder { id: String, z: u32 },
    UpdateFontSize { id: String, font_size: f64 },
    SetText { id: String, text: String },
    SetOpacity { id: String, opacity: f64 },
    SetRotation { id: String, rotation: f64 },
    AddElement { element: Element },
    RemoveElement { id: String },
}

impl InternalEdit {
    pub fn id(&self) -> &str {
        match self {
            InternalEdit::Move { id, .. }
            | InternalEdit::Resize { id, .. }
            | InternalEdit::Recolor { id, .. }
            | InternalEdit::Reorder { id, .. }
            | InternalEdit::UpdateFontSize { id, .. }
            | InternalEdit::SetText { id, .. }
            | InternalEdit::SetOpacity { id, .. }
            | InternalEdit::SetRotation { id, .. }
            | InternalEdit::RemoveElement { id, .. } => id,
            InternalEdit::AddElement { element } => element.id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClampedEdit {
    pub edit: InternalEdit,
    pub clamped: bool,
}

#[derive(Debug, Clone)]
pub struct FailedEdit {
    pub description: String,
    pub reason: String,
}
