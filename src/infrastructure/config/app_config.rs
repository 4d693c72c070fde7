//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::ConfigOverrides;
use crate::application::services::{CoordinatorConfig, DEFAULT_MAX_CONCURRENT_FETCHES};

pub(crate) const APP_NAME: &str = "gallery-loader";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where the site is deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    /// Local development, photos may come from the API.
    #[default]
    Local,
    /// Cloud deployment, photos are static assets.
    Cloud,
}

/// How photos are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PhotosMode {
    /// Served from the filesystem, possibly behind the API.
    #[default]
    Filesystem,
    /// Served as static assets.
    Static,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Image loading configuration.
    #[serde(default)]
    pub images: ImageConfig,

    /// Photo location configuration.
    #[serde(default)]
    pub photos: PhotosConfig,
}

/// Image loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Maximum fetches running at once.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Quality used when a command does not specify one.
    #[serde(default)]
    pub default_downscale_quality: Option<f32>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            default_downscale_quality: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ImageConfig {
    /// Builds the coordinator configuration.
    #[must_use]
    pub const fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

/// Photo location configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    /// Deployment type.
    #[serde(default)]
    pub deployment: DeploymentType,

    /// Serving mode.
    #[serde(default)]
    pub mode: PhotosMode,

    /// Base URL of the API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// Site path under which photos are served.
    #[serde(default = "default_local_photos_path")]
    pub local_photos_path: String,

    /// External host serving the photos, overriding everything else.
    #[serde(default)]
    pub external_photos_url: Option<String>,

    /// Directory holding the site's public assets.
    #[serde(default = "default_public_root")]
    pub public_root: PathBuf,

    /// JSON file listing photo names to leave out of the index.
    #[serde(default = "default_omit_list")]
    pub omit_list: PathBuf,

    /// Where the generated photo index is written.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            deployment: DeploymentType::default(),
            mode: PhotosMode::default(),
            api_base_url: default_api_base_url(),
            local_photos_path: default_local_photos_path(),
            external_photos_url: None,
            public_root: default_public_root(),
            omit_list: default_omit_list(),
            index_path: default_index_path(),
        }
    }
}

impl PhotosConfig {
    /// Directory the photos live in on disk.
    #[must_use]
    pub fn photos_dir(&self) -> PathBuf {
        self.public_root
            .join(self.local_photos_path.trim_start_matches('/'))
    }
}

const fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

const fn default_timeout_secs() -> u64 {
    30
}

#[allow(clippy::unnecessary_wraps)]
fn default_api_base_url() -> Option<String> {
    Some("http://localhost:8090".to_string())
}

fn default_local_photos_path() -> String {
    "/assets/photos".to_string()
}

fn default_public_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_omit_list() -> PathBuf {
    PathBuf::from("public/dont-show.json")
}

fn default_index_path() -> PathBuf {
    PathBuf::from("public/photo-index.json")
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: ConfigOverrides) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(max) = args.max_concurrent_fetches {
            self.images.max_concurrent_fetches = max;
        }
        if let Some(deployment) = args.deployment {
            self.photos.deployment = deployment;
        }
        if let Some(mode) = args.photos_mode {
            self.photos.mode = mode;
        }
        if let Some(api_base_url) = args.api_base_url {
            self.photos.api_base_url = Some(api_base_url).filter(|url| !url.is_empty());
        }
        if let Some(external) = args.external_photos_url {
            self.photos.external_photos_url = Some(external).filter(|url| !url.is_empty());
        }
        if let Some(public_root) = args.public_root {
            self.photos.public_root = public_root;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("gallery-loader.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_sections() {
        let toml_content = r#"
            log_level = "debug"

            [images]
            max_concurrent_fetches = 6
            default_downscale_quality = 0.7

            [photos]
            deployment = "cloud"
            mode = "static"
            external_photos_url = "https://photos.example.com"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.images.max_concurrent_fetches, 6);
        assert_eq!(config.images.default_downscale_quality, Some(0.7));
        assert_eq!(config.images.timeout_secs, 30);
        assert_eq!(config.photos.deployment, DeploymentType::Cloud);
        assert_eq!(config.photos.mode, PhotosMode::Static);
        assert_eq!(
            config.photos.external_photos_url.as_deref(),
            Some("https://photos.example.com")
        );
        assert_eq!(
            config.photos.api_base_url.as_deref(),
            Some("http://localhost:8090")
        );
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.images.max_concurrent_fetches, 3);
        assert_eq!(config.images.coordinator_config().max_concurrent_fetches, 3);
        assert_eq!(config.photos.local_photos_path, "/assets/photos");
        assert_eq!(
            config.photos.photos_dir(),
            PathBuf::from("public/assets/photos")
        );
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = AppConfig::default();
        config.merge_with_args(ConfigOverrides {
            log_level: Some(LogLevel::Trace),
            max_concurrent_fetches: Some(8),
            api_base_url: Some(String::new()),
            public_root: Some(PathBuf::from("/srv/site")),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.images.max_concurrent_fetches, 8);
        assert_eq!(config.photos.api_base_url, None);
        assert_eq!(
            config.photos.photos_dir(),
            PathBuf::from("/srv/site/assets/photos")
        );
    }
}
