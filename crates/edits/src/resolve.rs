//! Semantic-id resolution (spec §4.7). The vision refiner names elements by
//! concept ("year-text", "winery-name"); this resolves that to the
//! document's actual element ids, deterministically and without crashing.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use labelforge_core::{Element, LabelDocument};

/// Canonical concepts a semantic id may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    Vintage,
    Producer,
    Region,
    Variety,
}

impl Concept {
    fn id_keywords(self) -> &'static [&'static str] {
        match self {
            Concept::Vintage => &["vintage", "year"],
            Concept::Producer => &["producer", "winery", "chateau", "domaine"],
            Concept::Region => &["region", "appellation"],
            Concept::Variety => &["variety", "grape", "varietal"],
        }
    }

    fn content_pattern(self) -> &'static Regex {
        static VINTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());
        static PRODUCER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ch[aâ]teau|domaine|winery|estate").unwrap());
        static REGION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[A-Z][a-zA-Z\s-]+$").unwrap());
        static VARIETY: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)cabernet|merlot|chardonnay|pinot|syrah|sauvignon|riesling").unwrap()
        });

        match self {
            Concept::Vintage => &VINTAGE,
            Concept::Producer => &PRODUCER,
            Concept::Region => &REGION,
            Concept::Variety => &VARIETY,
        }
    }

    fn all() -> [Concept; 4] {
        [Concept::Vintage, Concept::Producer, Concept::Region, Concept::Variety]
    }
}

/// Static synonym table, ranked by preference per concept (spec §4.7
/// step 2). First existing document id wins.
static ALIAS_TABLE: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        ("year-text", vec!["vintage", "year", "vintage-text"]),
        ("year", vec!["vintage", "vintage-text"]),
        ("winery-name", vec!["producer", "producer_text", "winery"]),
        ("producer-name", vec!["producer", "producer_text"]),
        ("winery", vec!["producer", "producer_text"]),
        ("appellation-text", vec!["region", "appellation", "region_text"]),
        ("appellation", vec!["region", "region_text"]),
        ("grape-variety", vec!["variety", "variety_text"]),
        ("varietal", vec!["variety", "variety_text"]),
    ])
});

fn text_content(element: &Element) -> Option<&str> {
    match element {
        Element::Text(t) => Some(t.text.as_str()),
        _ => None,
    }
}

fn concept_for_semantic_id(semantic_id: &str) -> Option<Concept> {
    let lower = semantic_id.to_lowercase();
    Concept::all()
        .into_iter()
        .find(|c| c.id_keywords().iter().any(|kw| lower.contains(kw)))
}

/// Resolves a semantic element id to an actual document element id
/// following the four-step cascade from spec §4.7. Returns `None` if every
/// step fails — callers must drop the operation and log a warning, never
/// treat this as an error.
pub fn resolve_element_id(doc: &LabelDocument, semantic_id: &str) -> Option<String> {
    // 1. Direct match.
    if doc.elements.iter().any(|e| e.id() == semantic_id) {
        return Some(semantic_id.to_string());
    }

    // 2. Semantic-alias lookup.
    if let Some(candidates) = ALIAS_TABLE.get(semantic_id) {
        for candidate in candidates {
            if doc.elements.iter().any(|e| e.id() == *candidate) {
                return Some((*candidate).to_string());
            }
        }
    }

    // 3. Fuzzy match by concept: id-keyword containment or content-regex.
    if let Some(concept) = concept_for_semantic_id(semantic_id) {
        let keywords = concept.id_keywords();
        let pattern = concept.content_pattern();

        for element in &doc.elements {
            let id_lower = element.id().to_lowercase();
            if keywords.iter().any(|kw| id_lower.contains(kw)) {
                return Some(element.id().to_string());
            }
        }
        for element in &doc.elements {
            if let Some(content) = text_content(element) {
                if pattern.is_match(content) {
                    return Some(element.id().to_string());
                }
            }
        }
    }

    // 4. Unresolved.
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::{
        Align, Bounds, Canvas, Contrast, Font, FontRef, FontStyle, Hierarchy, Palette,
        PaletteRole, ProducerEmphasis, RegionDisplay, TextElement, TextTransform, Temperature,
        Typography, VintageProminence,
    };

    fn doc_with_elements(elements: Vec<Element>) -> LabelDocument {
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
        doc.elements = elements;
        doc
    }

    fn text(id: &str, content: &str) -> Element {
        Element::Text(TextElement {
            id: id.to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.5, h: 0.1 },
            z: 0,
            text: content.to_string(),
            font: FontRef::Primary,
            color: PaletteRole::Primary,
            align: Align::Center,
            font_size: 18.0,
            line_height: 1.2,
            max_lines: 1,
            text_transform: TextTransform::None,
        })
    }

    #[test]
    fn direct_match_wins_even_if_alias_table_disagrees() {
        let doc = doc_with_elements(vec![text("year-text", "2020")]);
        assert_eq!(resolve_element_id(&doc, "year-text"), Some("year-text".to_string()));
    }

    #[test]
    fn alias_table_resolves_common_synonym() {
        let doc = doc_with_elements(vec![text("vintage", "2020")]);
        assert_eq!(resolve_element_id(&doc, "year-text"), Some("vintage".to_string()));
    }

    #[test]
    fn fuzzy_concept_match_by_id_keyword() {
        let doc = doc_with_elements(vec![text("main_vintage_display", "2020")]);
        assert_eq!(
            resolve_element_id(&doc, "vintage-year-label"),
            Some("main_vintage_display".to_string())
        );
    }

    #[test]
    fn fuzzy_concept_match_by_content_regex() {
        let doc = doc_with_elements(vec![text("label_3", "2020")]);
        assert_eq!(resolve_element_id(&doc, "year-value"), Some("label_3".to_string()));
    }

    #[test]
    fn unresolvable_semantic_id_returns_none() {
        let doc = doc_with_elements(vec![text("unrelated", "hello")]);
        assert_eq!(resolve_element_id(&doc, "completely-unknown-concept"), None);
    }
}
