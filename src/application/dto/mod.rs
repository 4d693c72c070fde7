//! Data transfer objects for the application layer.

mod warm_dto;

pub use warm_dto::{WarmReport, WarmRequest};
