//! Image handling infrastructure.
//!
//! This module provides:
//! - Fetching from HTTP or the public directory, with decoding
//! - JPEG re-encoding for downscaled copies
//! - An in-memory blob store for transient handles

pub mod blob_store;
pub mod canvas;
pub mod fetcher;

pub use blob_store::{BlobStoreStats, MemoryBlobStore};
pub use canvas::JpegCanvas;
pub use fetcher::{SourceFetcher, decode};
