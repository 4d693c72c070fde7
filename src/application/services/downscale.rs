//! Best-effort downscaling of loaded images.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{FetchedImage, ResourceHandle};
use crate::domain::errors::CanvasError;
use crate::domain::ports::{BlobStorePort, CanvasPort};

/// Longest side of a downscaled image, in pixels.
pub const MAX_DOWNSCALE_DIMENSION: u32 = 800;

/// Content type of re-encoded images.
pub const DOWNSCALE_CONTENT_TYPE: &str = "image/jpeg";

/// Result of a downscale attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownscaleOutcome {
    /// A re-encoded copy was registered under a transient handle.
    Resized(ResourceHandle),
    /// Rendering failed; the caller keeps the original resource.
    FellBackToOriginal(CanvasError),
}

/// Computes the target size: aspect ratio kept, longer side capped at
/// [`MAX_DOWNSCALE_DIMENSION`]. Images already within bounds keep their size.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let max = MAX_DOWNSCALE_DIMENSION;
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = |side: u32, longer: u32| -> u32 {
        let scaled = (f64::from(side) / f64::from(longer) * f64::from(max)).round() as u32;
        scaled.max(1)
    };

    if width > height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Maps a `(0, 1)` quality onto the encoder's `1..=100` scale.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Renders `fetched` at the target size and registers the JPEG as a blob.
///
/// Never fails: any rendering error is reported as
/// [`DownscaleOutcome::FellBackToOriginal`].
pub async fn downscale(
    canvas: Arc<dyn CanvasPort>,
    blobs: &dyn BlobStorePort,
    fetched: &FetchedImage,
    quality: f32,
) -> DownscaleOutcome {
    let (width, height) = target_dimensions(fetched.width(), fetched.height());
    let percent = quality_percent(quality);
    let image = fetched.image.clone();

    let rendered =
        tokio::task::spawn_blocking(move || canvas.render_jpeg(&image, width, height, percent))
            .await
            .map_err(|e| CanvasError::Panicked(e.to_string()))
            .and_then(|result| result);

    match rendered {
        Ok(bytes) => {
            debug!(width, height, quality = percent, size = bytes.len(), "Downscaled image");
            let url = blobs.create(bytes, DOWNSCALE_CONTENT_TYPE);
            DownscaleOutcome::Resized(ResourceHandle::Transient(url))
        }
        Err(e) => DownscaleOutcome::FellBackToOriginal(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::FailingCanvas;
    use crate::infrastructure::image::{JpegCanvas, MemoryBlobStore};
    use test_case::test_case;

    #[test_case(640, 480, (640, 480) ; "within_bounds")]
    #[test_case(800, 800, (800, 800) ; "exactly_max")]
    #[test_case(1600, 1200, (800, 600) ; "landscape")]
    #[test_case(1200, 1600, (600, 800) ; "portrait")]
    #[test_case(2000, 2000, (800, 800) ; "square")]
    #[test_case(5000, 3, (800, 1) ; "sliver_keeps_one_pixel")]
    #[test_case(900, 100, (800, 89) ; "rounds_short_side")]
    fn test_target_dimensions(width: u32, height: u32, expected: (u32, u32)) {
        assert_eq!(target_dimensions(width, height), expected);
    }

    #[test_case(0.5, 50 ; "half")]
    #[test_case(0.756, 76 ; "rounds")]
    #[test_case(0.001, 1 ; "floor_clamped")]
    fn test_quality_percent(quality: f32, expected: u8) {
        assert_eq!(quality_percent(quality), expected);
    }

    #[tokio::test]
    async fn test_downscale_registers_blob() {
        let blobs = MemoryBlobStore::new();
        let fetched = FetchedImage::new(image::DynamicImage::new_rgb8(1600, 900));

        let outcome = downscale(Arc::new(JpegCanvas), &blobs, &fetched, 0.6).await;

        let DownscaleOutcome::Resized(ResourceHandle::Transient(url)) = outcome else {
            panic!("expected a resized transient handle");
        };
        let (bytes, content_type) = blobs.get(&url).unwrap();
        assert_eq!(content_type, DOWNSCALE_CONTENT_TYPE);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 450));
    }

    #[tokio::test]
    async fn test_downscale_failure_falls_back() {
        let blobs = MemoryBlobStore::new();
        let fetched = FetchedImage::new(image::DynamicImage::new_rgb8(100, 100));

        let outcome = downscale(Arc::new(FailingCanvas), &blobs, &fetched, 0.5).await;

        assert!(matches!(outcome, DownscaleOutcome::FellBackToOriginal(_)));
        assert_eq!(blobs.stats().created, 0);
    }
}
