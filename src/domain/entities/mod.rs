//! Domain entity definitions.

mod image;
mod photo_index;

pub use image::{
    BlobUrl, FetchedImage, LoadOptions, LoadStatus, Rendition, ResourceHandle, ResourceId,
    StatusSnapshot,
};
pub use photo_index::{DirectoryNode, FileDetails};
