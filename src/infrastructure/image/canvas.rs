//! JPEG re-encoding surface built on the `image` crate.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::domain::errors::CanvasError;
use crate::domain::ports::CanvasPort;

/// Off-screen surface that resizes with a triangle filter and encodes JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCanvas;

impl CanvasPort for JpegCanvas {
    fn render_jpeg(
        &self,
        image: &image::DynamicImage,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Bytes, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptySurface { width, height });
        }

        // JPEG has no alpha channel.
        let surface = if image.width() == width && image.height() == height {
            image.to_rgb8()
        } else {
            image
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8()
        };

        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));
        surface
            .write_with_encoder(encoder)
            .map_err(|e| CanvasError::Encode(e.to_string()))?;

        Ok(Bytes::from(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_resizes_and_encodes() {
        let source = image::DynamicImage::new_rgba8(1600, 800);
        let bytes = JpegCanvas.render_jpeg(&source, 800, 400, 50).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 400);
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let mut source = image::RgbImage::new(256, 256);
        for (x, y, pixel) in source.enumerate_pixels_mut() {
            *pixel = image::Rgb([(x ^ y) as u8, (x * 3) as u8, (y * 7) as u8]);
        }
        let source = image::DynamicImage::ImageRgb8(source);

        let high = JpegCanvas.render_jpeg(&source, 256, 256, 95).unwrap();
        let low = JpegCanvas.render_jpeg(&source, 256, 256, 10).unwrap();

        assert!(low.len() < high.len());
    }

    #[test]
    fn test_empty_surface_rejected() {
        let source = image::DynamicImage::new_rgb8(10, 10);
        let result = JpegCanvas.render_jpeg(&source, 0, 10, 80);

        assert_eq!(
            result,
            Err(CanvasError::EmptySurface {
                width: 0,
                height: 10
            })
        );
    }
}
