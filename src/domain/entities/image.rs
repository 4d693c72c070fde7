//! Domain types for image loading.

use std::sync::Arc;

use crate::domain::errors::LoadError;

/// Identifier of a loadable image resource (a path or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a new `ResourceId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is an `http(s)` URL.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// URL of a transient, memory-backed blob (`blob:<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// Scheme prefix shared by every blob URL.
    pub const SCHEME: &'static str = "blob:";

    /// Wraps a raw blob URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference handed back to callers once an image is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceHandle {
    /// The original resource, usable as-is.
    Original(ResourceId),
    /// A re-encoded copy held in the blob store. Must be revoked on eviction.
    Transient(BlobUrl),
}

impl ResourceHandle {
    /// Returns the URL-like string a renderer would use.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Original(id) => id.as_str(),
            Self::Transient(blob) => blob.as_str(),
        }
    }

    /// Returns true if the handle references a revocable transient resource.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url())
    }
}

/// Status of a cache entry within one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A fetch is queued or running.
    Pending,
    /// The image is loaded and a handle is available.
    Loaded,
    /// The fetch or decode failed.
    Failed,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Loaded => write!(f, "loaded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Which version of the image a loaded handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendition {
    /// No downscale was requested.
    Original,
    /// The image was downscaled and re-encoded.
    Resized,
    /// Downscaling was requested but failed, the original is used instead.
    FellBackToOriginal,
}

/// Per-call load options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadOptions {
    /// Re-encode quality in `(0, 1)`. Values outside that range disable downscaling.
    pub downscale_quality: Option<f32>,
}

impl LoadOptions {
    /// Options that downscale to the given quality.
    #[must_use]
    pub const fn downscaled(quality: f32) -> Self {
        Self {
            downscale_quality: Some(quality),
        }
    }

    /// Returns the quality to downscale with, if downscaling applies.
    #[must_use]
    pub fn effective_quality(&self) -> Option<f32> {
        self.downscale_quality
            .filter(|q| q.is_finite() && *q > 0.0 && *q < 1.0)
    }
}

/// Snapshot of a cache entry delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Current status.
    pub status: LoadStatus,
    /// Handle, present only when loaded.
    pub handle: Option<ResourceHandle>,
    /// Error, present only when failed.
    pub error: Option<LoadError>,
    /// Rendition of the handle, present only when loaded.
    pub rendition: Option<Rendition>,
}

impl StatusSnapshot {
    /// Snapshot of a freshly queued load.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: LoadStatus::Pending,
            handle: None,
            error: None,
            rendition: None,
        }
    }

    /// Returns true if the snapshot is terminal.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self.status, LoadStatus::Pending)
    }
}

/// A fetched and decoded image along with its natural dimensions.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Decoded pixels.
    pub image: Arc<image::DynamicImage>,
}

impl FetchedImage {
    /// Wraps a decoded image.
    #[must_use]
    pub fn new(image: image::DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Natural width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Natural height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_quality_range() {
        assert_eq!(LoadOptions::default().effective_quality(), None);
        assert_eq!(LoadOptions::downscaled(0.5).effective_quality(), Some(0.5));
        assert_eq!(LoadOptions::downscaled(1.0).effective_quality(), None);
        assert_eq!(LoadOptions::downscaled(0.0).effective_quality(), None);
        assert_eq!(LoadOptions::downscaled(-0.3).effective_quality(), None);
        assert_eq!(LoadOptions::downscaled(f32::NAN).effective_quality(), None);
    }

    #[test]
    fn test_handle_url() {
        let original = ResourceHandle::Original(ResourceId::new("/assets/photos/a.jpg"));
        let transient = ResourceHandle::Transient(BlobUrl::new("blob:1234"));

        assert_eq!(original.url(), "/assets/photos/a.jpg");
        assert!(!original.is_transient());
        assert_eq!(transient.to_string(), "blob:1234");
        assert!(transient.is_transient());
    }

    #[test]
    fn test_remote_detection() {
        assert!(ResourceId::new("https://example.com/a.png").is_remote());
        assert!(ResourceId::new("http://localhost:8090/assets/photos/a.png").is_remote());
        assert!(!ResourceId::new("/assets/photos/a.png").is_remote());
    }
}
