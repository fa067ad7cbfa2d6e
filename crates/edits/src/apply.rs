//! Applies validated edits to produce a new, immutable document (spec
//! §4.7 "Application"). Per-edit rules re-clamp at apply time since an
//! edit's effect depends on the element's *current* bounds, which
//! `validate_edits` does not have visibility into.

use labelforge_core::{Element, LabelDocument};

use crate::algebra::{ClampedEdit, FailedEdit, InternalEdit};
use crate::mapper::PaletteEdit;

pub struct ApplyResult {
    pub updated_doc: LabelDocument,
    pub applied_edits: Vec<InternalEdit>,
    pub failed_edits: Vec<FailedEdit>,
}

/// Applies document-level palette edits. Separate from [`apply`] because
/// these target `document.palette` rather than an element.
pub fn apply_document_edits(mut doc: LabelDocument, edits: &[PaletteEdit]) -> LabelDocument {
    for edit in edits {
        let slot = match edit.role {
            labelforge_core::PaletteRole::Primary => &mut doc.palette.primary,
            labelforge_core::PaletteRole::Secondary => &mut doc.palette.secondary,
            labelforge_core::PaletteRole::Accent => &mut doc.palette.accent,
            labelforge_core::PaletteRole::Background => &mut doc.palette.background,
        };
        *slot = edit.hex.clone();
    }
    doc
}

/// Applies the element-targeting algebra in order, producing a deep-copied
/// document. Edits that fail at apply time (e.g. a recolor targeting an
/// image element that slipped past validation) are recorded as failed
/// rather than aborting the whole batch.
pub fn apply(doc: &LabelDocument, edits: Vec<ClampedEdit>) -> ApplyResult {
    let mut updated = doc.clone();
    let mut applied_edits = Vec::new();
    let mut failed_edits = Vec::new();

    for clamped in edits {
        let edit = clamped.edit;
        match apply_one(&mut updated, &edit) {
            Ok(()) => applied_edits.push(edit),
            Err(reason) => failed_edits.push(FailedEdit {
                description: format!("{edit:?}"),
                reason,
            }),
        }
    }

    ApplyResult {
        updated_doc: updated,
        applied_edits,
        failed_edits,
    }
}

fn find_element_mut<'a>(doc: &'a mut LabelDocument, id: &str) -> Option<&'a mut Element> {
    doc.elements.iter_mut().find(|e| e.id() == id)
}

fn apply_one(doc: &mut LabelDocument, edit: &InternalEdit) -> Result<(), String> {
    match edit {
        InternalEdit::Move { id, dx, dy } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            let bounds = bounds_mut(element);
            bounds.x = (bounds.x + dx).clamp(0.0, 1.0 - bounds.w.min(1.0));
            bounds.y = (bounds.y + dy).clamp(0.0, 1.0 - bounds.h.min(1.0));
            Ok(())
        }
        InternalEdit::Resize { id, dw, dh } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            let bounds = bounds_mut(element);
            bounds.w = (bounds.w + dw).clamp(0.0001, (1.0 - bounds.x).max(0.0001));
            bounds.h = (bounds.h + dh).clamp(0.0001, (1.0 - bounds.y).max(0.0001));
            Ok(())
        }
        InternalEdit::Recolor { id, role } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            match element {
                Element::Text(t) => {
                    t.color = *role;
                    Ok(())
                }
                Element::Shape(s) => {
                    s.color = *role;
                    Ok(())
                }
                Element::Image(_) => Err(format!("cannot recolor image element {id}")),
            }
        }
        InternalEdit::Reorder { id, z } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            set_z(element, (*z).min(1000));
            Ok(())
        }
        InternalEdit::UpdateFontSize { id, font_size } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            match element {
                Element::Text(t) => {
                    t.font_size = font_size.round().max(1.0);
                    Ok(())
                }
                _ => Err(format!("fontSize edit targets non-text element {id}")),
            }
        }
        InternalEdit::SetText { id, text } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            match element {
                Element::Text(t) => {
                    t.text = text.clone();
                    Ok(())
                }
                _ => Err(format!("text edit targets non-text element {id}")),
            }
        }
        InternalEdit::SetOpacity { id, opacity } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            match element {
                Element::Image(i) => {
                    i.opacity = *opacity;
                    Ok(())
                }
                _ => Err(format!("opacity edit targets non-image element {id}")),
            }
        }
        InternalEdit::SetRotation { id, rotation } => {
            let element = find_element_mut(doc, id).ok_or_else(|| format!("unknown id: {id}"))?;
            match element {
                Element::Image(i) => {
                    i.rotation = *rotation;
                    Ok(())
                }
                Element::Shape(s) => {
                    s.rotation = *rotation;
                    Ok(())
                }
                Element::Text(_) => Err(format!("rotation edit targets text element {id}")),
            }
        }
        InternalEdit::AddElement { element } => {
            if doc.elements.iter().any(|e| e.id() == element.id()) {
                return Err(format!("element id already exists: {}", element.id()));
            }
            doc.elements.push(element.clone());
            Ok(())
        }
        InternalEdit::RemoveElement { id } => {
            let before = doc.elements.len();
            doc.elements.retain(|e| e.id() != id);
            if doc.elements.len() == before {
                return Err(format!("unknown id: {id}"));
            }
            Ok(())
        }
    }
}

fn bounds_mut(element: &mut Element) -> &mut labelforge_core::Bounds {
    match element {
        Element::Text(t) => &mut t.bounds,
        Element::Image(i) => &mut i.bounds,
        Element::Shape(s) => &mut s.bounds,
    }
}

fn set_z(element: &mut Element, z: u32) {
    match element {
        Element::Text(t) => t.z = z,
        Element::Image(i) => i.z = z,
        Element::Shape(s) => s.z = z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate_edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS};
    use labelforge_core::{
        Align, Bounds, Canvas, Contrast, Font, FontRef, FontStyle, Hierarchy, Palette,
        PaletteRole, ProducerEmphasis, RegionDisplay, TextElement, TextTransform, Temperature,
        Typography, VintageProminence,
    };

    fn doc_with_one_element() -> LabelDocument {
        let canvas = Canvas { width: 750.0, height: 1000.0, dpi: 300.0, background: "#fff".to_string() };
        let palette = Palette {
            primary: "#111".to_string(),
            secondary: "#222".to_string(),
            accent: "#333".to_string(),
            background: "#fff".to_string(),
            temperature: Temperature::Neutral,
            contrast: Contrast::Medium,
        };
        let font = Font { family: "Garamond".to_string(), weight: 400, style: FontStyle::Normal, letter_spacing: 0.0 };
        let typography = Typography {
            primary: font.clone(),
            secondary: font,
            hierarchy: Hierarchy {
                producer_emphasis: ProducerEmphasis::Dominant,
                vintage_prominence: VintageProminence::Standard,
                region_display: RegionDisplay::Integrated,
            },
        };
        let mut doc = LabelDocument::skeleton(canvas, palette, typography);
        doc.elements.push(Element::Text(TextElement {
            id: "el1".to_string(),
            bounds: Bounds { x: 0.9, y: 0.9, w: 0.3, h: 0.3 },
            z: 0,
            text: "hi".to_string(),
            font: FontRef::Primary,
            color: PaletteRole::Primary,
            align: Align::Center,
            font_size: 18.0,
            line_height: 1.2,
            max_lines: 1,
            text_transform: TextTransform::None,
        }));
        doc
    }

    #[test]
    fn move_is_clamped_to_keep_element_within_canvas() {
        let doc = doc_with_one_element();
        let edits = vec![InternalEdit::Move { id: "el1".to_string(), dx: 0.2, dy: 0.2 }];
        let validated = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&doc, validated.accepted);

        let Element::Text(t) = &result.updated_doc.elements[0] else { panic!("expected text") };
        assert!(t.bounds.x + t.bounds.w <= 1.0 + 1e-9);
        assert!(t.bounds.y + t.bounds.h <= 1.0 + 1e-9);
        assert!(result.failed_edits.is_empty());
    }

    #[test]
    fn font_size_update_rounds_to_integer_minimum_one() {
        let doc = doc_with_one_element();
        let edits = vec![InternalEdit::UpdateFontSize { id: "el1".to_string(), font_size: 0.4 }];
        let validated = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&doc, validated.accepted);

        let Element::Text(t) = &result.updated_doc.elements[0] else { panic!("expected text") };
        assert_eq!(t.font_size, 1.0);
    }

    #[test]
    fn set_text_replaces_text_content() {
        let doc = doc_with_one_element();
        let edits = vec![InternalEdit::SetText { id: "el1".to_string(), text: "Reserve Bottling".to_string() }];
        let validated = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&doc, validated.accepted);

        let Element::Text(t) = &result.updated_doc.elements[0] else { panic!("expected text") };
        assert_eq!(t.text, "Reserve Bottling");
        assert!(result.failed_edits.is_empty());
    }

    #[test]
    fn set_opacity_fails_against_text_element() {
        let doc = doc_with_one_element();
        let edits = vec![InternalEdit::SetOpacity { id: "el1".to_string(), opacity: 0.5 }];
        let validated = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&doc, validated.accepted);

        assert_eq!(result.failed_edits.len(), 1);
    }

    #[test]
    fn add_element_then_remove_element_round_trips() {
        let doc = doc_with_one_element();
        let new_el = Element::Text(TextElement {
            id: "el2".to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.2, h: 0.1 },
            z: 1,
            text: "Estate Grown".to_string(),
            font: FontRef::Secondary,
            color: PaletteRole::Secondary,
            align: Align::Center,
            font_size: 12.0,
            line_height: 1.1,
            max_lines: 1,
            text_transform: TextTransform::None,
        });
        let edits = vec![InternalEdit::AddElement { element: new_el }];
        let validated = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&doc, validated.accepted);
        assert_eq!(result.updated_doc.elements.len(), 2);
        assert!(result.failed_edits.is_empty());

        let edits = vec![InternalEdit::RemoveElement { id: "el1".to_string() }];
        let validated = validate_edits(&result.updated_doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        let result = apply(&result.updated_doc, validated.accepted);
        assert_eq!(result.updated_doc.elements.len(), 1);
        assert_eq!(result.updated_doc.elements[0].id(), "el2");
    }
}
