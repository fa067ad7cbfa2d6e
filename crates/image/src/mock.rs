//! Deterministic `ImageAdapter` for tests and offline development. Renders
//! a flat-color PNG sized per the requested aspect, with the color derived
//! from the spec id so different assets are visibly distinguishable.

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use labelforge_core::{LabelError, LabelResult};

use crate::adapter::ImageAdapter;
use crate::spec::{ImageMeta, ImageOutput, ImageSpec};

pub struct MockImageAdapter {
    model: String,
}

impl MockImageAdapter {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }
}

impl Default for MockImageAdapter {
    fn default() -> Self {
        Self::new("mock-image-v1")
    }
}

fn color_for_id(id: &str) -> Rgb<u8> {
    let hash = id.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    Rgb([
        (hash & 0xFF) as u8,
        ((hash >> 8) & 0xFF) as u8,
        ((hash >> 16) & 0xFF) as u8,
    ])
}

#[async_trait]
impl ImageAdapter for MockImageAdapter {
    async fn generate(&self, spec: &ImageSpec) -> LabelResult<ImageOutput> {
        let (width, height) = spec.aspect.default_dimensions();
        let color = color_for_id(&spec.id);
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |_, _| color);

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(buffer)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| LabelError::Internal(anyhow::anyhow!("mock image encode failed: {e}")))?;

        Ok(ImageOutput {
            bytes,
            meta: ImageMeta {
                model: self.model.clone(),
                width,
                height,
                seed: Some(u64::from(u32::from_be_bytes([
                    color.0[0], color.0[1], color.0[2], 0,
                ]))),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Aspect, Purpose};

    #[tokio::test]
    async fn generates_valid_png_matching_requested_aspect() {
        let adapter = MockImageAdapter::default();
        let spec = ImageSpec {
            id: "label-bg".to_string(),
            purpose: Purpose::Background,
            prompt: "a vineyard at sunset".to_string(),
            negative_prompt: None,
            guidance: None,
            aspect: Aspect::FourThree,
        };

        let output = adapter.generate(&spec).await.unwrap();

        assert_eq!(&output.bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(output.meta.width, 1200);
        assert_eq!(output.meta.height, 900);
    }

    #[tokio::test]
    async fn same_id_yields_same_color_and_seed() {
        let adapter = MockImageAdapter::default();
        let spec = |id: &str| ImageSpec {
            id: id.to_string(),
            purpose: Purpose::Decoration,
            prompt: "ornamental border".to_string(),
            negative_prompt: None,
            guidance: Some(5.0),
            aspect: Aspect::OneOne,
        };

        let a = adapter.generate(&spec("vine-motif")).await.unwrap();
        let b = adapter.generate(&spec("vine-motif")).await.unwrap();

        assert_eq!(a.meta.seed, b.meta.seed);
    }
}
