//! Deterministic `RendererClient` for tests/offline development. Honors
//! canvas background, element z-order (ties broken by index, spec §5), and
//! clips element bounds to the canvas so rendered output is visibly
//! traceable to its document without depending on an external rasterizer.

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use labelforge_core::{Bounds, Canvas, LabelDocument, LabelError, LabelResult, Palette, PaletteRole};

use crate::client::{RenderOptions, RendererClient};

pub struct MockRendererClient;

impl Default for MockRendererClient {
    fn default() -> Self {
        Self
    }
}

fn parse_hex_color(hex: &str) -> Rgb<u8> {
    let hex = hex.trim_start_matches('#');
    let bytes = hex.as_bytes();
    if bytes.len() < 6 {
        return Rgb([128, 128, 128]);
    }
    let parse = |s: &[u8]| u8::from_str_radix(std::str::from_utf8(s).unwrap_or("80"), 16).unwrap_or(128);
    Rgb([parse(&bytes[0..2]), parse(&bytes[2..4]), parse(&bytes[4..6])])
}

fn resolve_color(palette: &Palette, role: PaletteRole) -> Rgb<u8> {
    parse_hex_color(palette.resolve(role))
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn bounds_to_px(bounds: Bounds, canvas: &Canvas) -> (u32, u32, u32, u32) {
    let x = (clamp01(bounds.x) * canvas.width) as u32;
    let y = (clamp01(bounds.y) * canvas.height) as u32;
    let w = (clamp01(bounds.w) * canvas.width).max(1.0) as u32;
    let h = (clamp01(bounds.h) * canvas.height).max(1.0) as u32;
    (x, y, w, h)
}

#[async_trait]
impl RendererClient for MockRendererClient {
    async fn render(&self, document: &LabelDocument, _options: RenderOptions) -> LabelResult<Vec<u8>> {
        let width = document.canvas.width.max(1.0) as u32;
        let height = document.canvas.height.max(1.0) as u32;
        let background = parse_hex_color(&document.canvas.background);

        let mut canvas: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, background);

        let mut ordered: Vec<(usize, &labelforge_core::Element)> =
            document.elements.iter().enumerate().collect();
        ordered.sort_by_key(|(idx, el)| (el.z(), *idx));

        for (_, element) in ordered {
            let color = match element {
                labelforge_core::Element::Text(t) => resolve_color(&document.palette, t.color),
                labelforge_core::Element::Shape(s) => resolve_color(&document.palette, s.color),
                labelforge_core::Element::Image(_) => Rgb([200, 200, 200]),
            };
            let (x, y, w, h) = bounds_to_px(element.bounds(), &document.canvas);

            for py in y..(y + h).min(height) {
                for px in x..(x + w).min(width) {
                    canvas.put_pixel(px, py, color);
                }
            }
        }

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(canvas)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| LabelError::Internal(anyhow::anyhow!("mock render encode failed: {e}")))?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelforge_core::{
        Align, Contrast, Font, FontRef, FontStyle, Hierarchy, ProducerEmphasis, RegionDisplay,
        TextElement, TextTransform, Temperature, Typography, VintageProminence,
    };

    fn sample_document() -> LabelDocument {
        let canvas = Canvas {
            width: 100.0,
            height: 150.0,
            dpi: 300.0,
            background: "#FFFFFF".to_string(),
        };
        let palette = Palette {
            primary: "#112233".to_string(),
            secondary: "#445566".to_string(),
            accent: "#778899".to_string(),
            background: "#FFFFFF".to_string(),
            temperature: Temperature::Neutral,
            contrast: Contrast::Medium,
        };
        let font = Font {
            family: "Garamond".to_string(),
            weight: 400,
            style: FontStyle::Normal,
            letter_spacing: 0.0,
        };
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
        doc.elements.push(labelforge_core::Element::Text(TextElement {
            id: "producer".to_string(),
            bounds: Bounds { x: 0.1, y: 0.1, w: 0.8, h: 0.2 },
            z: 0,
            text: "Château Test".to_string(),
            font: FontRef::Primary,
            color: PaletteRole::Primary,
            align: Align::Center,
            font_size: 24.0,
            line_height: 1.2,
            max_lines: 1,
            text_transform: TextTransform::Uppercase,
        }));
        doc
    }

    #[tokio::test]
    async fn renders_png_matching_magic_bytes() {
        let renderer = MockRendererClient::default();
        let doc = sample_document();

        let bytes = renderer.render(&doc, RenderOptions::with_default_timeout()).await.unwrap();

        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
