//! Document validator (C1) — a single reusable engine rather than bespoke
//! per-type checks, per spec §9. Every check pushes an [`Issue`] into an
//! accumulator instead of raising, so a single pass reports everything wrong
//! with a document instead of stopping at the first problem.

use std::collections::HashSet;

use crate::document::{Bounds, Element, LabelDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    TooBig,
    TooSmall,
    BadEnum,
    MissingRequired,
    UnknownAssetRef,
    UnreferencedAsset,
    DuplicateId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub code: IssueCode,
}

impl Issue {
    fn new(path: impl Into<String>, code: IssueCode) -> Self {
        Self {
            path: path.into(),
            code,
        }
    }
}

type Issues = Vec<Issue>;

/// Full validation: canvas/palette/typography ranges, per-element bounds
/// and enums, and the cross-reference invariants from spec §3. Does not
/// distinguish design-scheme vs detailed-layout shape — use
/// [`validate_design_scheme`] / [`validate_detailed_layout`] for that.
pub fn validate(doc: &LabelDocument) -> Result<(), Issues> {
    let mut issues = Vec::new();

    check_canvas(doc, &mut issues);
    check_palette(doc, &mut issues);
    check_typography(doc, &mut issues);
    check_elements(doc, &mut issues);
    check_cross_references(doc, &mut issues, false);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// The design-scheme stage's output must carry empty `assets` and `elements`
/// alongside a fully populated canvas/palette/typography (spec §4.8).
pub fn validate_design_scheme(doc: &LabelDocument) -> Result<(), Issues> {
    let mut issues = Vec::new();

    check_canvas(doc, &mut issues);
    check_palette(doc, &mut issues);
    check_typography(doc, &mut issues);

    if !doc.assets.is_empty() {
        issues.push(Issue::new("assets", IssueCode::TooBig));
    }
    if !doc.elements.is_empty() {
        issues.push(Issue::new("elements", IssueCode::TooBig));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// The detailed-layout stage's output must be a fully populated, cross-
/// reference-clean document with at least `required_min_assets` assets.
pub fn validate_detailed_layout(
    doc: &LabelDocument,
    required_min_assets: usize,
) -> Result<(), Issues> {
    let mut issues = Vec::new();

    check_canvas(doc, &mut issues);
    check_palette(doc, &mut issues);
    check_typography(doc, &mut issues);
    check_elements(doc, &mut issues);
    check_cross_references(doc, &mut issues, true);

    if doc.assets.len() < required_min_assets {
        issues.push(Issue::new("assets", IssueCode::TooSmall));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_canvas(doc: &LabelDocument, issues: &mut Issues) {
    if doc.canvas.width <= 0.0 {
        issues.push(Issue::new("canvas.width", IssueCode::TooSmall));
    }
    if doc.canvas.height <= 0.0 {
        issues.push(Issue::new("canvas.height", IssueCode::TooSmall));
    }
    if doc.canvas.dpi <= 0.0 {
        issues.push(Issue::new("canvas.dpi", IssueCode::TooSmall));
    }
    if doc.canvas.background.trim().is_empty() {
        issues.push(Issue::new("canvas.background", IssueCode::MissingRequired));
    }
}

fn check_palette(doc: &LabelDocument, issues: &mut Issues) {
    let palette = &doc.palette;
    for (path, hex) in [
        ("palette.primary", &palette.primary),
        ("palette.secondary", &palette.secondary),
        ("palette.accent", &palette.accent),
        ("palette.background", &palette.background),
    ] {
        if !is_hex_color(hex) {
            issues.push(Issue::new(path, IssueCode::BadEnum));
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn check_font(path: &str, font: &crate::document::Font, issues: &mut Issues) {
    if font.family.trim().is_empty() {
        issues.push(Issue::new(format!("{path}.family"), IssueCode::MissingRequired));
    }
    if !(100..=900).contains(&font.weight) {
        issues.push(Issue::new(format!("{path}.weight"), IssueCode::BadEnum));
    }
}

fn check_typography(doc: &LabelDocument, issues: &mut Issues) {
    check_font("typography.primary", &doc.typography.primary, issues);
    check_font("typography.secondary", &doc.typography.secondary, issues);
}

fn check_bounds(path: &str, bounds: Bounds, issues: &mut Issues) {
    for (field, value) in [
        ("x", bounds.x),
        ("y", bounds.y),
        ("w", bounds.w),
        ("h", bounds.h),
    ] {
        if value < 0.0 {
            issues.push(Issue::new(format!("{path}.{field}"), IssueCode::TooSmall));
        } else if value > 1.0 {
            issues.push(Issue::new(format!("{path}.{field}"), IssueCode::TooBig));
        }
    }
}

fn check_elements(doc: &LabelDocument, issues: &mut Issues) {
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for (idx, element) in doc.elements.iter().enumerate() {
        let base = format!("elements.{idx}");
        let id = element.id();

        if !seen_ids.insert(id) {
            issues.push(Issue::new(format!("{base}.id"), IssueCode::DuplicateId));
        }

        check_bounds(&format!("{base}.bounds"), element.bounds(), issues);

        if element.z() > 1000 {
            issues.push(Issue::new(format!("{base}.z"), IssueCode::TooBig));
        }

        match element {
            Element::Text(t) => {
                if t.font_size <= 0.0 {
                    issues.push(Issue::new(format!("{base}.fontSize"), IssueCode::TooSmall));
                }
                if t.line_height <= 0.0 {
                    issues.push(Issue::new(format!("{base}.lineHeight"), IssueCode::TooSmall));
                }
                if !(1..=10).contains(&t.max_lines) {
                    issues.push(Issue::new(format!("{base}.maxLines"), IssueCode::BadEnum));
                }
            }
            Element::Image(img) => {
                if !(0.0..=1.0).contains(&img.opacity) {
                    issues.push(Issue::new(format!("{base}.opacity"), IssueCode::BadEnum));
                }
                if !(-180.0..=180.0).contains(&img.rotation) {
                    issues.push(Issue::new(format!("{base}.rotation"), IssueCode::BadEnum));
                }
            }
            Element::Shape(shape) => {
                if !(0.0..=20.0).contains(&shape.stroke_width) {
                    issues.push(Issue::new(format!("{base}.strokeWidth"), IssueCode::BadEnum));
                }
                if !(-180.0..=180.0).contains(&shape.rotation) {
                    issues.push(Issue::new(format!("{base}.rotation"), IssueCode::BadEnum));
                }
            }
        }
    }
}

/// Cross-reference invariants from spec §3. `require_full_coverage` is set
/// for the detailed-layout stage only — the design-scheme stage has no
/// assets to reference yet.
fn check_cross_references(doc: &LabelDocument, issues: &mut Issues, require_full_coverage: bool) {
    let asset_ids: HashSet<&str> = doc.assets.iter().map(|a| a.id.as_str()).collect();
    let mut referenced: HashSet<&str> = HashSet::new();

    for (idx, element) in doc.elements.iter().enumerate() {
        if let Element::Image(img) = element {
            if asset_ids.contains(img.asset_id.as_str()) {
                referenced.insert(img.asset_id.as_str());
            } else {
                issues.push(Issue::new(
                    format!("elements.{idx}.assetId"),
                    IssueCode::UnknownAssetRef,
                ));
            }
        }
    }

    if require_full_coverage {
        for (idx, asset) in doc.assets.iter().enumerate() {
            if !referenced.contains(asset.id.as_str()) {
                issues.push(Issue::new(
                    format!("assets.{idx}"),
                    IssueCode::UnreferencedAsset,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::*;

    fn full_canvas() -> Canvas {
        Canvas {
            width: 750.0,
            height: 1000.0,
            dpi: 300.0,
            background: "#ffffff".to_string(),
        }
    }

    fn full_palette() -> Palette {
        Palette {
            primary: "#1a1a1a".to_string(),
            secondary: "#7a1f2b".to_string(),
            accent: "#c9a227".to_string(),
            background: "#f5f0e6".to_string(),
            temperature: Temperature::Warm,
            contrast: Contrast::High,
        }
    }

    fn full_typography() -> Typography {
        Typography {
            primary: Font {
                family: "Garamond".to_string(),
                weight: 600,
                style: FontStyle::Normal,
                letter_spacing: 0.0,
            },
            secondary: Font {
                family: "Futura".to_string(),
                weight: 400,
                style: FontStyle::Normal,
                letter_spacing: 1.0,
            },
            hierarchy: Hierarchy {
                producer_emphasis: ProducerEmphasis::Dominant,
                vintage_prominence: VintageProminence::Featured,
                region_display: RegionDisplay::Integrated,
            },
        }
    }

    #[test]
    fn design_scheme_must_have_empty_assets_and_elements() {
        let doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        assert!(validate_design_scheme(&doc).is_ok());
    }

    #[test]
    fn design_scheme_rejects_populated_elements() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.elements.push(Element::Shape(ShapeElement {
            id: "line1".to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.8, h: 0.01 },
            z: 1,
            shape: ShapeKind::Line,
            color: PaletteRole::Primary,
            stroke_width: 1.0,
            rotation: 0.0,
        }));
        assert!(validate_design_scheme(&doc).is_err());
    }

    #[test]
    fn bounds_exactly_at_zero_and_one_are_valid() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.assets.push(Asset {
            id: "bg".to_string(),
            asset_type: "image".to_string(),
            url: "https://cdn/content/deadbeef.png".to_string(),
            width: 100,
            height: 100,
        });
        doc.elements.push(Element::Image(ImageElement {
            id: "bg-img".to_string(),
            bounds: Bounds { x: 0.0, y: 0.0, w: 1.0, h: 1.0 },
            z: 0,
            asset_id: "bg".to_string(),
            fit: Fit::Cover,
            opacity: 1.0,
            rotation: 0.0,
        }));
        assert!(validate_detailed_layout(&doc, 1).is_ok());
    }

    #[test]
    fn bounds_strictly_outside_unit_square_are_rejected() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.elements.push(Element::Shape(ShapeElement {
            id: "line1".to_string(),
            bounds: Bounds { x: -0.01, y: 0.1, w: 0.8, h: 0.01 },
            z: 1,
            shape: ShapeKind::Line,
            color: PaletteRole::Primary,
            stroke_width: 1.0,
            rotation: 0.0,
        }));
        let issues = validate(&doc).unwrap_err();
        assert!(issues.iter().any(|i| i.path == "elements.0.bounds.x"));
    }

    #[test]
    fn z_above_1000_is_rejected() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.elements.push(Element::Shape(ShapeElement {
            id: "line1".to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.8, h: 0.01 },
            z: 1001,
            shape: ShapeKind::Line,
            color: PaletteRole::Primary,
            stroke_width: 1.0,
            rotation: 0.0,
        }));
        let issues = validate(&doc).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.path == "elements.0.z" && i.code == IssueCode::TooBig));
    }

    #[test]
    fn unknown_asset_ref_is_rejected() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.elements.push(Element::Image(ImageElement {
            id: "img1".to_string(),
            bounds: Bounds { x: 0.0, y: 0.0, w: 1.0, h: 1.0 },
            z: 0,
            asset_id: "does-not-exist".to_string(),
            fit: Fit::Cover,
            opacity: 1.0,
            rotation: 0.0,
        }));
        let issues = validate(&doc).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.code == IssueCode::UnknownAssetRef));
    }

    #[test]
    fn unreferenced_asset_rejected_only_for_detailed_layout() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        doc.assets.push(Asset {
            id: "unused".to_string(),
            asset_type: "image".to_string(),
            url: "https://cdn/content/deadbeef.png".to_string(),
            width: 100,
            height: 100,
        });
        assert!(validate_detailed_layout(&doc, 1).is_err());
    }

    #[test]
    fn malformed_palette_hex_is_rejected() {
        let mut palette = full_palette();
        palette.accent = "gold".to_string();
        let doc = LabelDocument::skeleton(full_canvas(), palette, full_typography());
        let issues = validate(&doc).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.path == "palette.accent" && i.code == IssueCode::BadEnum));
    }

    #[test]
    fn duplicate_element_ids_are_rejected() {
        let mut doc = LabelDocument::skeleton(full_canvas(), full_palette(), full_typography());
        for _ in 0..2 {
            doc.elements.push(Element::Shape(ShapeElement {
                id: "dup".to_string(),
                bounds: Bounds { x: 0.1, y: 0.1, w: 0.1, h: 0.1 },
                z: 1,
                shape: ShapeKind::Line,
                color: PaletteRole::Primary,
                stroke_width: 1.0,
                rotation: 0.0,
            }));
        }
        let issues = validate(&doc).unwrap_err();
        assert!(issues.iter().any(|i| i.code == IssueCode::DuplicateId));
    }
}
