mod blob_store_port;
mod canvas_port;
mod image_fetch_port;
mod status_observer_port;

pub use blob_store_port::BlobStorePort;
pub use canvas_port::CanvasPort;
pub use image_fetch_port::ImageFetchPort;
pub use status_observer_port::{ObserverRef, StatusObserver, same_observer};
