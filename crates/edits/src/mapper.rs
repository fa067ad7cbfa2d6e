//! Maps a vision-refiner [`EditOperation`] onto zero or more [`InternalEdit`]
//! values, resolving semantic ids and translating values along the way
//! (spec §4.7). Unresolvable operations are dropped, never propagated as
//! errors — the caller logs the warning.

use labelforge_core::{Element, LabelDocument, PaletteRole};
use labelforge_vision::{ElementProperty, EditOperation};
use tracing::warn;

use crate::algebra::InternalEdit;
use crate::resolve::resolve_element_id;
use crate::translate::{nearest_palette_role, parse_relative_font_size, BoundsDelta};

/// Maps one high-level operation to zero or more algebra edits. A single
/// `update_element.bounds` operation can expand into both a `move` and a
/// `resize` edit (spec §4.7 "Value translation").
pub fn map_operation(doc: &LabelDocument, operation: &EditOperation) -> Vec<InternalEdit> {
    match operation {
        EditOperation::UpdatePalette { .. } | EditOperation::UpdateTypography { .. } => {
            // Document-level edits (palette roles, typography faces) sit
            // outside the per-element algebra this module validates and
            // clamps; see `map_document_edit` and `apply::apply_document_edits`.
            Vec::new()
        }
        EditOperation::UpdateElement { element_id, property, value } => {
            map_update_element(doc, element_id, *property, value)
        }
        EditOperation::AddElement { element } => {
            vec![InternalEdit::AddElement { element: element.clone() }]
        }
        EditOperation::RemoveElement { element_id } => {
            let Some(resolved_id) = resolve_element_id(doc, element_id) else {
                warn!(element_id, "could not resolve element id, dropping edit");
                return Vec::new();
            };
            vec![InternalEdit::RemoveElement { id: resolved_id }]
        }
    }
}

/// A validated palette-role hex replacement (spec §4.7 "Value translation").
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEdit {
    pub role: PaletteRole,
    pub hex: String,
}

/// Resolves `update_palette` operations to document-level palette edits.
/// `target` may already name a role directly, or may need nearest-color
/// projection if the refiner emitted a bare hex value as the target.
pub fn map_document_edits(doc: &LabelDocument, operations: &[EditOperation]) -> Vec<PaletteEdit> {
    operations
        .iter()
        .filter_map(|op| match op {
            EditOperation::UpdatePalette { target, value } => {
                let role = match target.to_lowercase().as_str() {
                    "primary" => Some(PaletteRole::Primary),
                    "secondary" => Some(PaletteRole::Secondary),
                    "accent" => Some(PaletteRole::Accent),
                    "background" => Some(PaletteRole::Background),
                    _ => nearest_palette_role(target, &doc.palette),
                };
                match role {
                    Some(role) => Some(PaletteEdit { role, hex: value.clone() }),
                    None => {
                        warn!(target, "could not resolve palette target, dropping edit");
                        None
                    }
                }
            }
            _ => None,
        })
        .collect()
}

fn map_update_element(
    doc: &LabelDocument,
    semantic_id: &str,
    property: ElementProperty,
    value: &serde_json::Value,
) -> Vec<InternalEdit> {
    let Some(resolved_id) = resolve_element_id(doc, semantic_id) else {
        warn!(semantic_id, "could not resolve element id, dropping edit");
        return Vec::new();
    };

    let Some(element) = doc.elements.iter().find(|e| e.id() == resolved_id) else {
        return Vec::new();
    };

    match property {
        ElementProperty::Bounds => map_bounds_edit(&resolved_id, value),
        ElementProperty::FontSize => map_font_size_edit(element, &resolved_id, value),
        ElementProperty::Color => map_color_edit(doc, element, &resolved_id, value),
        ElementProperty::Text => map_text_edit(element, &resolved_id, value),
        ElementProperty::Opacity => map_opacity_edit(element, &resolved_id, value),
        ElementProperty::Rotation => map_rotation_edit(element, &resolved_id, value),
    }
}

fn map_bounds_edit(resolved_id: &str, value: &serde_json::Value) -> Vec<InternalEdit> {
    let delta = BoundsDelta::from_json(value);
    let mut edits = Vec::new();
    if delta.is_move() {
        edits.push(InternalEdit::Move {
            id: resolved_id.to_string(),
            dx: delta.dx,
            dy: delta.dy,
        });
    }
    if delta.is_resize() {
        edits.push(InternalEdit::Resize {
            id: resolved_id.to_string(),
            dw: delta.dw,
            dh: delta.dh,
        });
    }
    edits
}

fn map_font_size_edit(element: &Element, resolved_id: &str, value: &serde_json::Value) -> Vec<InternalEdit> {
    let Element::Text(text) = element else {
        warn!(resolved_id, "fontSize edit targets a non-text element, dropping");
        return Vec::new();
    };
    let Some(raw) = value.as_str().map(str::to_string).or_else(|| value.as_f64().map(|n| n.to_string())) else {
        return Vec::new();
    };
    match parse_relative_font_size(&raw, text.font_size) {
        Some(font_size) => vec![InternalEdit::UpdateFontSize {
            id: resolved_id.to_string(),
            font_size,
        }],
        None => Vec::new(),
    }
}

fn map_color_edit(
    doc: &LabelDocument,
    element: &Element,
    resolved_id: &str,
    value: &serde_json::Value,
) -> Vec<InternalEdit> {
    if matches!(element, Element::Image(_)) {
        warn!(resolved_id, "recolor targets an image element, dropping (unsupported)");
        return Vec::new();
    }
    let Some(hex) = value.as_str() else {
        return Vec::new();
    };
    match nearest_palette_role(hex, &doc.palette) {
        Some(role) => vec![InternalEdit::Recolor {
            id: resolved_id.to_string(),
            role,
        }],
        None => Vec::new(),
    }
}

fn map_text_edit(element: &Element, resolved_id: &str, value: &serde_json::Value) -> Vec<InternalEdit> {
    let Element::Text(_) = element else {
        warn!(resolved_id, "text edit targets a non-text element, dropping");
        return Vec::new();
    };
    let Some(text) = value.as_str() else {
        return Vec::new();
    };
    vec![InternalEdit::SetText {
        id: resolved_id.to_string(),
        text: text.to_string(),
    }]
}

fn map_opacity_edit(element: &Element, resolved_id: &str, value: &serde_json::Value) -> Vec<InternalEdit> {
    let Element::Image(_) = element else {
        warn!(resolved_id, "opacity edit targets a non-image element, dropping");
        return Vec::new();
    };
    let Some(opacity) = value.as_f64() else {
        return Vec::new();
    };
    vec![InternalEdit::SetOpacity {
        id: resolved_id.to_string(),
        opacity,
    }]
}

fn map_rotation_edit(element: &Element, resolved_id: &str, value: &serde_json::Value) -> Vec<InternalEdit> {
    if matches!(element, Element::Text(_)) {
        warn!(resolved_id, "rotation edit targets a text element, dropping (unsupported)");
        return Vec::new();
    }
    let Some(rotation) = value.as_f64() else {
        return Vec::new();
    };
    vec![InternalEdit::SetRotation {
        id: resolved_id.to_string(),
        rotation,
    }]
}
