// ImageProcessor backed by the `image` crate

use crate::blur::blur_bitmap;
use bluromatic_core::domain::BlurLevel;
use bluromatic_core::port::{ImageError, ImageProcessor};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Decodes any supported format, always encodes PNG
#[derive(Debug, Default, Clone, Copy)]
pub struct PngImageProcessor;

impl PngImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
    }

    fn encode(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

impl ImageProcessor for PngImageProcessor {
    fn blur(&self, source: &[u8], level: BlurLevel) -> Result<Vec<u8>, ImageError> {
        let img = Self::decode(source)?;
        debug!(width = img.width(), height = img.height(), level = %level, "Blurring bitmap");
        let blurred = blur_bitmap(&img, level)?;
        Self::encode(&blurred)
    }

    fn to_png(&self, source: &[u8]) -> Result<Vec<u8>, ImageError> {
        Self::encode(&Self::decode(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn jpeg_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 30, 30])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_blur_outputs_png_of_same_size() {
        let png = PngImageProcessor::new()
            .blur(&jpeg_bytes(50, 40), BlurLevel::default())
            .unwrap();

        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 40));
    }

    #[test]
    fn test_to_png_converts_format() {
        let png = PngImageProcessor::new().to_png(&jpeg_bytes(8, 8)).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let err = PngImageProcessor::new()
            .blur(b"not an image", BlurLevel::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn test_tiny_image_fails() {
        let err = PngImageProcessor::new()
            .blur(&jpeg_bytes(4, 4), BlurLevel::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::TooSmall { .. }));
    }
}
