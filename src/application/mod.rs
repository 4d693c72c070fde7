//! Application layer containing services, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{WarmReport, WarmRequest};
pub use services::{CoordinatorConfig, CoordinatorStats, ImageCoordinator};
pub use use_cases::WarmGalleryUseCase;
