//! Photo directory indexing and URL resolution.

/// Photo directory scanning.
pub mod indexer;
/// Photo URL resolution.
pub mod url_resolver;

pub use indexer::{IndexError, OmitList, PHOTO_EXTENSIONS, PhotoIndexer};
pub use url_resolver::PhotoUrlResolver;
