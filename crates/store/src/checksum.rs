//! Content hashing and format/dimension sniffing (spec §4.4 steps 1-2).

use labelforge_core::{AssetFormat, LabelError, LabelResult};
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Decodes `bytes` to discover format and pixel dimensions, rejecting any
/// format outside `{png, jpg, webp}`.
pub fn sniff_format_and_dimensions(bytes: &[u8]) -> LabelResult<(AssetFormat, u32, u32)> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LabelError::Validation(format!("could not determine image format: {e}")))?;

    let format = match reader.format() {
        Some(image::ImageFormat::Png) => AssetFormat::Png,
        Some(image::ImageFormat::Jpeg) => AssetFormat::Jpg,
        Some(image::ImageFormat::WebP) => AssetFormat::Webp,
        other => {
            return Err(LabelError::Validation(format!(
                "unsupported asset format: {other:?}"
            )))
        }
    };

    let dimensions = reader
        .into_dimensions()
        .map_err(|e| LabelError::Validation(format!("could not decode image dimensions: {e}")))?;

    Ok((format, dimensions.0, dimensions.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_stable_and_distinct() {
        let a = sha256_hex(b"hello");
        let b = sha256_hex(b"hello");
        let c = sha256_hex(b"world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn sniffs_a_generated_png() {
        let mut bytes = Vec::new();
        let buffer = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        image::DynamicImage::ImageRgb8(buffer)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let (format, width, height) = sniff_format_and_dimensions(&bytes).unwrap();
        assert_eq!(format, AssetFormat::Png);
        assert_eq!((width, height), (4, 4));
    }

    #[test]
    fn rejects_unrecognizable_bytes() {
        assert!(sniff_format_and_dimensions(b"not an image").is_err());
    }
}
