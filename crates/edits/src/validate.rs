//! Validation pipeline for post-mapping edits (spec §4.7 "Validation
//! pipeline"), run before `apply()` ever touches the document.

use labelforge_core::LabelDocument;

use crate::algebra::{ClampedEdit, FailedEdit, InternalEdit};

pub const DEFAULT_MAX_DELTA: f64 = 0.2;
pub const DEFAULT_MAX_EDITS: usize = 10;

pub struct ValidationOutcome {
    pub accepted: Vec<ClampedEdit>,
    pub rejected: Vec<FailedEdit>,
}

/// Runs the four-step pipeline: reject-unknown-id, clamp-deltas,
/// reject-malformed, truncate-to-max. Order matters — clamping happens
/// before truncation so the first `max_edits` *valid* edits survive.
pub fn validate_edits(
    doc: &LabelDocument,
    edits: Vec<InternalEdit>,
    max_delta: f64,
    max_edits: usize,
) -> ValidationOutcome {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for edit in edits {
        let id_problem = match &edit {
            InternalEdit::AddElement { element } => doc
                .elements
                .iter()
                .any(|e| e.id() == element.id())
                .then(|| format!("element id already exists: {}", element.id())),
            other => (!doc.elements.iter().any(|e| e.id() == other.id()))
                .then(|| format!("unknown element id: {}", other.id())),
        };
        if let Some(reason) = id_problem {
            rejected.push(FailedEdit {
                description: format!("{edit:?}"),
                reason,
            });
            continue;
        }

        if let Some(malformed_reason) = malformed_reason(&edit) {
            rejected.push(FailedEdit {
                description: format!("{edit:?}"),
                reason: malformed_reason,
            });
            continue;
        }

        let clamped = clamp(edit, max_delta);
        accepted.push(clamped);
    }

    if accepted.len() > max_edits {
        let overflow: Vec<ClampedEdit> = accepted.split_off(max_edits);
        for clamped in overflow {
            rejected.push(FailedEdit {
                description: format!("{:?}", clamped.edit),
                reason: "Exceeded maximum edits limit".to_string(),
            });
        }
    }

    ValidationOutcome { accepted, rejected }
}

fn malformed_reason(edit: &InternalEdit) -> Option<String> {
    match edit {
        InternalEdit::Reorder { z, .. } if *z > 10_000 => {
            // A z far beyond the clampable range signals a malformed op
            // rather than a value that should simply be clamped.
            Some(format!("z value {z} is not a plausible z-order"))
        }
        InternalEdit::UpdateFontSize { font_size, .. } if *font_size <= 0.0 || !font_size.is_finite() => {
            Some(format!("font size {font_size} is not a positive finite number"))
        }
        InternalEdit::Move { dx, dy, .. } if !dx.is_finite() || !dy.is_finite() => {
            Some("move delta is not finite".to_string())
        }
        InternalEdit::Resize { dw, dh, .. } if !dw.is_finite() || !dh.is_finite() => {
            Some("resize delta is not finite".to_string())
        }
        InternalEdit::SetOpacity { opacity, .. } if !opacity.is_finite() => {
            Some(format!("opacity {opacity} is not finite"))
        }
        InternalEdit::SetRotation { rotation, .. } if !rotation.is_finite() => {
            Some(format!("rotation {rotation} is not finite"))
        }
        InternalEdit::SetText { text, .. } if text.trim().is_empty() => {
            Some("text value is empty".to_string())
        }
        _ => None,
    }
}

fn clamp(edit: InternalEdit, max_delta: f64) -> ClampedEdit {
    match edit {
        InternalEdit::Move { id, dx, dy } => {
            let clamped_dx = dx.clamp(-max_delta, max_delta);
            let clamped_dy = dy.clamp(-max_delta, max_delta);
            let was_clamped = clamped_dx != dx || clamped_dy != dy;
            ClampedEdit {
                edit: InternalEdit::Move { id, dx: clamped_dx, dy: clamped_dy },
                clamped: was_clamped,
            }
        }
        InternalEdit::Resize { id, dw, dh } => {
            let clamped_dw = dw.clamp(-max_delta, max_delta);
            let clamped_dh = dh.clamp(-max_delta, max_delta);
            let was_clamped = clamped_dw != dw || clamped_dh != dh;
            ClampedEdit {
                edit: InternalEdit::Resize { id, dw: clamped_dw, dh: clamped_dh },
                clamped: was_clamped,
            }
        }
        InternalEdit::Reorder { id, z } => {
            let clamped_z = z.min(1000);
            let was_clamped = clamped_z != z;
            ClampedEdit {
                edit: InternalEdit::Reorder { id, z: clamped_z },
                clamped: was_clamped,
            }
        }
        InternalEdit::SetOpacity { id, opacity } => {
            let clamped_opacity = opacity.clamp(0.0, 1.0);
            let was_clamped = clamped_opacity != opacity;
            ClampedEdit {
                edit: InternalEdit::SetOpacity { id, opacity: clamped_opacity },
                clamped: was_clamped,
            }
        }
        InternalEdit::SetRotation { id, rotation } => {
            let clamped_rotation = rotation.clamp(-180.0, 180.0);
            let was_clamped = clamped_rotation != rotation;
            ClampedEdit {
                edit: InternalEdit::SetRotation { id, rotation: clamped_rotation },
                clamped: was_clamped,
            }
        }
        other => ClampedEdit { edit: other, clamped: false },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::{
        Canvas, Contrast, Font, FontStyle, Hierarchy, Palette, PaletteRole, ProducerEmphasis,
        RegionDisplay, Temperature, Typography, VintageProminence,
    };

    fn doc_with_one_element(id: &str) -> LabelDocument {
        use labelforge_core::{Align, Bounds, Element, FontRef, TextElement, TextTransform};

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
            id: id.to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.5, h: 0.1 },
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
    fn unknown_id_is_rejected() {
        let doc = doc_with_one_element("known");
        let edits = vec![InternalEdit::Move { id: "unknown".to_string(), dx: 0.01, dy: 0.0 }];
        let outcome = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn deltas_beyond_max_are_clamped_not_rejected() {
        let doc = doc_with_one_element("el1");
        let edits = vec![InternalEdit::Move { id: "el1".to_string(), dx: 0.9, dy: -0.9 }];
        let outcome = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.accepted[0].clamped);
        match &outcome.accepted[0].edit {
            InternalEdit::Move { dx, dy, .. } => {
                assert_eq!(*dx, DEFAULT_MAX_DELTA);
                assert_eq!(*dy, -DEFAULT_MAX_DELTA);
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn truncates_to_max_edits() {
        let doc = doc_with_one_element("el1");
        let edits: Vec<InternalEdit> = (0..15)
            .map(|i| InternalEdit::UpdateFontSize { id: "el1".to_string(), font_size: 10.0 + i as f64 })
            .collect();
        let outcome = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        assert_eq!(outcome.accepted.len(), DEFAULT_MAX_EDITS);
        assert_eq!(outcome.rejected.len(), 5);
    }

    #[test]
    fn malformed_font_size_is_rejected() {
        let doc = doc_with_one_element("el1");
        let edits = vec![InternalEdit::UpdateFontSize { id: "el1".to_string(), font_size: -5.0 }];
        let outcome = validate_edits(&doc, edits, DEFAULT_MAX_DELTA, DEFAULT_MAX_EDITS);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }
}
