//! Port definition for transient blob handles.

use bytes::Bytes;

use crate::domain::entities::BlobUrl;

/// Registry of transient, memory-backed resources addressed by blob URLs.
pub trait BlobStorePort: Send + Sync {
    /// Registers `data` and returns a fresh URL for it.
    fn create(&self, data: Bytes, content_type: &str) -> BlobUrl;

    /// Releases the resource behind `url`. Returns false if it was already gone.
    fn revoke(&self, url: &BlobUrl) -> bool;
}
