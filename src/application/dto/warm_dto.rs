//! Gallery warm-up DTOs.

use crate::application::services::CoordinatorStats;
use crate::domain::entities::{LoadOptions, ResourceHandle, ResourceId};
use crate::domain::errors::LoadError;

/// Request to preload a set of images.
#[derive(Debug, Clone, Default)]
pub struct WarmRequest {
    /// Images to load, in dispatch order.
    pub ids: Vec<ResourceId>,
    /// Options applied to every load.
    pub options: LoadOptions,
}

impl WarmRequest {
    /// Creates a request loading `ids` at full quality.
    #[must_use]
    pub fn new(ids: Vec<ResourceId>) -> Self {
        Self {
            ids,
            options: LoadOptions::default(),
        }
    }

    /// Downscales every image to `quality`.
    #[must_use]
    pub const fn with_downscale_quality(mut self, quality: f32) -> Self {
        self.options.downscale_quality = Some(quality);
        self
    }
}

/// Outcome of a warm-up run.
#[derive(Debug, Clone)]
pub struct WarmReport {
    /// Images that loaded, with their handles.
    pub loaded: Vec<(ResourceId, ResourceHandle)>,
    /// Images that failed.
    pub failed: Vec<LoadError>,
    /// Downscale attempts that fell back to the original.
    pub fallbacks: usize,
    /// Coordinator counters after the run.
    pub stats: CoordinatorStats,
}

impl WarmReport {
    /// Returns true if every image loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl std::fmt::Display for WarmReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} loaded, {} failed, {} downscale fallbacks",
            self.loaded.len(),
            self.failed.len(),
            self.fallbacks
        )
    }
}
