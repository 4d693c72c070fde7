//! In-memory blob store backing transient image handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::entities::BlobUrl;
use crate::domain::ports::BlobStorePort;

#[derive(Debug)]
struct Blob {
    data: Bytes,
    content_type: String,
}

/// Blob registry keyed by `blob:<uuid>` URLs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobUrl, Blob>>,
    created: AtomicU64,
    revoked: AtomicU64,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes and content type behind `url`, if still live.
    #[must_use]
    pub fn get(&self, url: &BlobUrl) -> Option<(Bytes, String)> {
        self.blobs
            .read()
            .get(url)
            .map(|blob| (blob.data.clone(), blob.content_type.clone()))
    }

    /// Returns true if `url` has not been revoked.
    #[must_use]
    pub fn contains(&self, url: &BlobUrl) -> bool {
        self.blobs.read().contains_key(url)
    }

    /// Returns store statistics.
    #[must_use]
    pub fn stats(&self) -> BlobStoreStats {
        let blobs = self.blobs.read();
        BlobStoreStats {
            live: blobs.len(),
            live_bytes: blobs.values().map(|b| b.data.len()).sum(),
            created: self.created.load(Ordering::Relaxed),
            revoked: self.revoked.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about the blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobStoreStats {
    /// Blobs currently registered.
    pub live: usize,
    /// Bytes held by live blobs.
    pub live_bytes: usize,
    /// Blobs ever created.
    pub created: u64,
    /// Blobs revoked.
    pub revoked: u64,
}

impl std::fmt::Display for BlobStoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Blobs: {} live ({} bytes), {} created, {} revoked",
            self.live, self.live_bytes, self.created, self.revoked
        )
    }
}

impl BlobStorePort for MemoryBlobStore {
    fn create(&self, data: Bytes, content_type: &str) -> BlobUrl {
        let url = BlobUrl::new(format!("{}{}", BlobUrl::SCHEME, Uuid::new_v4()));
        trace!(url = %url, size = data.len(), "Registering blob");
        self.blobs.write().insert(
            url.clone(),
            Blob {
                data,
                content_type: content_type.to_string(),
            },
        );
        self.created.fetch_add(1, Ordering::Relaxed);
        url
    }

    fn revoke(&self, url: &BlobUrl) -> bool {
        if self.blobs.write().remove(url).is_some() {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            debug!(url = %url, "Revoked blob");
            true
        } else {
            false
        }
    }
}
