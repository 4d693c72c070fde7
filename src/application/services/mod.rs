//! Application services.

pub mod downscale;
pub mod image_coordinator;

pub use downscale::{DownscaleOutcome, MAX_DOWNSCALE_DIMENSION, target_dimensions};
pub use image_coordinator::{
    CoordinatorConfig, CoordinatorStats, DEFAULT_MAX_CONCURRENT_FETCHES, ImageCoordinator,
    LoadFuture, LoadResult,
};
