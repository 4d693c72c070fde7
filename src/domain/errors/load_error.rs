//! Image loading error types.

use thiserror::Error;

use crate::domain::entities::ResourceId;

/// Errors surfaced by the load coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    /// Fetching or decoding the resource failed.
    #[error("failed to load image {id}: {reason}")]
    Failed { id: ResourceId, reason: FetchError },

    /// The load was discarded by an eviction before it settled.
    #[error("load of image {id} was cancelled by eviction")]
    Cancelled { id: ResourceId },
}

impl LoadError {
    /// Creates a load failure for the given resource.
    #[must_use]
    pub fn failed(id: &ResourceId, reason: FetchError) -> Self {
        Self::Failed {
            id: id.clone(),
            reason,
        }
    }

    /// Returns the identifier this error refers to.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        match self {
            Self::Failed { id, .. } | Self::Cancelled { id } => id,
        }
    }
}

/// Errors raised by an image fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("fetch task panicked: {0}")]
    Panicked(String),
}

/// Errors raised while rendering a downscaled copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CanvasError {
    #[error("cannot render onto an empty {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("render task panicked: {0}")]
    Panicked(String),
}
