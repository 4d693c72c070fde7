//! Port definition for fetching images.

use async_trait::async_trait;

use crate::domain::entities::{FetchedImage, ResourceId};
use crate::domain::errors::FetchError;

/// Port for fetching and decoding an image by identifier.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Fetches and decodes the image identified by `id`.
    async fn fetch(&self, id: &ResourceId) -> Result<FetchedImage, FetchError>;
}
