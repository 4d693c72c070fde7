//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image fetching, re-encoding and blob storage.
pub mod image;
/// Photo indexing and URL resolution.
pub mod photos;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use image::{JpegCanvas, MemoryBlobStore, SourceFetcher};
pub use photos::{PhotoIndexer, PhotoUrlResolver};
