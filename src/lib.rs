//! Gallery Loader - image loading for a personal photo gallery.
//!
//! This crate coordinates image loads with per-identifier deduplication,
//! bounded concurrency, status observers and optional downscaling, and
//! provides the photo index generator and URL resolution used by the gallery.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "gallery-loader";
