//! The label document model (DSL) — version-tagged, declarative description
//! of a printable label. See spec §3 for the authoritative field list.

use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub canvas: Canvas,
    pub palette: Palette,
    pub typography: Typography,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub dpi: f64,
    pub background: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Warm,
    Cool,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub temperature: Temperature,
    pub contrast: Contrast,
}

/// A palette role referenced by name rather than by hex value — text and
/// shape colors always point at one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteRole {
    Primary,
    Secondary,
    Accent,
    Background,
}

impl Palette {
    /// Resolve a role to its hex string.
    pub fn resolve(&self, role: PaletteRole) -> &str {
        match role {
            PaletteRole::Primary => &self.primary,
            PaletteRole::Secondary => &self.secondary,
            PaletteRole::Accent => &self.accent,
            PaletteRole::Background => &self.background,
        }
    }

    /// The four roles paired with their current hex values, in a stable
    /// order used by nearest-color projection (C7).
    pub fn roles(&self) -> [(PaletteRole, &str); 4] {
        [
            (PaletteRole::Primary, &self.primary),
            (PaletteRole::Secondary, &self.secondary),
            (PaletteRole::Accent, &self.accent),
            (PaletteRole::Background, &self.background),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub letter_spacing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProducerEmphasis {
    Dominant,
    Balanced,
    Subtle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VintageProminence {
    Featured,
    Standard,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionDisplay {
    Prominent,
    Integrated,
    Subtle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hierarchy {
    pub producer_emphasis: ProducerEmphasis,
    pub vintage_prominence: VintageProminence,
    pub region_display: RegionDisplay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Typography {
    pub primary: Font,
    pub secondary: Font,
    pub hierarchy: Hierarchy,
}

/// Which of the two typography faces an element draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRef {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type", default = "default_asset_type")]
    pub asset_type: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

fn default_asset_type() -> String {
    "image".to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    Uppercase,
    Lowercase,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Contain,
    Cover,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    pub id: String,
    pub bounds: Bounds,
    pub z: u32,
    pub text: String,
    pub font: FontRef,
    pub color: PaletteRole,
    pub align: Align,
    pub font_size: f64,
    pub line_height: f64,
    pub max_lines: u8,
    pub text_transform: TextTransform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: String,
    pub bounds: Bounds,
    pub z: u32,
    pub asset_id: String,
    pub fit: Fit,
    pub opacity: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeElement {
    pub id: String,
    pub bounds: Bounds,
    pub z: u32,
    pub shape: ShapeKind,
    pub color: PaletteRole,
    pub stroke_width: f64,
    pub rotation: f64,
}

/// A positioned, z-ordered element on the label — one of three variants,
/// discriminated on the wire by `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Shape(ShapeElement),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Element::Text(e) => &e.id,
            Element::Image(e) => &e.id,
            Element::Shape(e) => &e.id,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Element::Text(e) => e.bounds,
            Element::Image(e) => e.bounds,
            Element::Shape(e) => e.bounds,
        }
    }

    pub fn z(&self) -> u32 {
        match self {
            Element::Text(e) => e.z,
            Element::Image(e) => e.z,
            Element::Shape(e) => e.z,
        }
    }
}

impl LabelDocument {
    /// A document with fully populated canvas/palette/typography but empty
    /// assets and elements — the shape required of the design-scheme stage.
    pub fn skeleton(canvas: Canvas, palette: Palette, typography: Typography) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            canvas,
            palette,
            typography,
            assets: Vec::new(),
            elements: Vec::new(),
        }
    }
}
