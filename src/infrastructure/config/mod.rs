//! Application configuration.

/// Configuration file model.
pub mod app_config;
/// Command line arguments.
pub mod args;
/// Configuration file loading.
pub mod storage;

pub use app_config::{
    AppConfig, DeploymentType, ImageConfig, LogLevel, PhotosConfig, PhotosMode,
};
pub use args::{CliArgs, Command, ConfigOverrides};
pub use storage::{ConfigError, StorageManager};
