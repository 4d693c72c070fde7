//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{LoadOptions, LoadStatus, ResourceHandle, ResourceId, StatusSnapshot};
pub use errors::{FetchError, LoadError};
pub use ports::{BlobStorePort, CanvasPort, ImageFetchPort, StatusObserver};
