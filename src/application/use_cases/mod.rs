//! Use case implementations.

mod warm_gallery_use_case;

pub use warm_gallery_use_case::WarmGalleryUseCase;
