//! Port definition for the off-screen drawing surface.

use bytes::Bytes;

use crate::domain::errors::CanvasError;

/// Off-screen surface able to resize an image and re-encode it as JPEG.
///
/// Rendering is CPU-bound; callers run it on a blocking thread.
pub trait CanvasPort: Send + Sync {
    /// Draws `image` at `width`x`height` and encodes it with `quality` in `1..=100`.
    ///
    /// # Errors
    /// Returns error if the surface cannot be drawn or encoded.
    fn render_jpeg(
        &self,
        image: &image::DynamicImage,
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Bytes, CanvasError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Canvas that always fails to encode.
    pub struct FailingCanvas;

    impl CanvasPort for FailingCanvas {
        fn render_jpeg(
            &self,
            _image: &image::DynamicImage,
            _width: u32,
            _height: u32,
            _quality: u8,
        ) -> Result<Bytes, CanvasError> {
            Err(CanvasError::Encode("simulated encoder failure".to_string()))
        }
    }
}
