//! Palm photo preparation: downsize, re-encode as JPEG under the upload
//! budget, and wrap as a data URI for the vision model.

use std::io::Cursor;

use astroai_core::error::{AstroError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};

pub const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_OUTPUT_BYTES: usize = 800 * 1024;
pub const MAX_DIMENSION: u32 = 1_500;

const INITIAL_QUALITY: u8 = 80;
const MIN_QUALITY: u8 = 40;
const QUALITY_STEP: u8 = 10;

/// An encoded palm photo ready to be sent as an `image_url` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalmImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
    /// Size of the JPEG before base64 encoding.
    pub bytes: usize,
    pub quality: u8,
}

/// Validates, downsizes and compresses an uploaded photo.
///
/// Accepts `image/jpeg`, `image/png` and `image/webp`. If the floor quality
/// still exceeds the output budget the floor-quality encoding is used.
pub fn prepare_palm_image(bytes: &[u8], mime: &str) -> Result<PalmImage> {
    let format = accepted_format(mime).ok_or_else(|| {
        AstroError::validation("image", format!("Unsupported image type: {mime}"))
    })?;
    if bytes.is_empty() {
        return Err(AstroError::validation("image", "Image is empty"));
    }
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(AstroError::validation(
            "image",
            "Image is too large. Please choose a photo under 10 MB.",
        ));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AstroError::image(format!("Failed to decode image: {e}")))?;
    let rgb = downsize(decoded).to_rgb8();

    let mut quality = INITIAL_QUALITY;
    let mut jpeg = encode_jpeg(&rgb, quality)?;
    while jpeg.len() > MAX_OUTPUT_BYTES && quality > MIN_QUALITY {
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
        jpeg = encode_jpeg(&rgb, quality)?;
    }

    tracing::debug!(
        input_bytes = bytes.len(),
        output_bytes = jpeg.len(),
        width = rgb.width(),
        height = rgb.height(),
        quality,
        "Prepared palm image"
    );

    Ok(PalmImage {
        data_uri: format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)),
        width: rgb.width(),
        height: rgb.height(),
        bytes: jpeg.len(),
        quality,
    })
}

fn accepted_format(mime: &str) -> Option<ImageFormat> {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

fn downsize(img: DynamicImage) -> DynamicImage {
    if img.width().max(img.height()) <= MAX_DIMENSION {
        return img;
    }
    // `resize` keeps the aspect ratio within the bounds.
    img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Triangle)
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AstroError::image(format!("Failed to encode JPEG: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_small_png_becomes_jpeg_data_uri() {
        let prepared = prepare_palm_image(&png_bytes(64, 48), "image/png").unwrap();
        assert!(prepared.data_uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!((prepared.width, prepared.height), (64, 48));
        assert_eq!(prepared.quality, INITIAL_QUALITY);

        let encoded = prepared.data_uri.trim_start_matches("data:image/jpeg;base64,");
        let jpeg = BASE64.decode(encoded).unwrap();
        assert_eq!(jpeg.len(), prepared.bytes);
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_longest_side_is_capped() {
        let prepared = prepare_palm_image(&png_bytes(2_000, 1_000), "image/png").unwrap();
        assert_eq!(prepared.width, MAX_DIMENSION);
        assert_eq!(prepared.height, 750);
        assert!(prepared.quality >= MIN_QUALITY);
    }

    #[test]
    fn test_rejects_unsupported_and_oversized() {
        let err = prepare_palm_image(&[1, 2, 3], "image/heic").unwrap_err();
        assert!(err.is_validation());

        let huge = vec![0u8; MAX_INPUT_BYTES + 1];
        assert!(prepare_palm_image(&huge, "image/jpeg").unwrap_err().is_validation());

        assert!(prepare_palm_image(&[], "image/png").unwrap_err().is_validation());
    }

    #[test]
    fn test_corrupt_bytes_are_image_errors() {
        let err = prepare_palm_image(b"not really a png", "image/png").unwrap_err();
        assert!(matches!(err, AstroError::Image(_)));
    }
}
