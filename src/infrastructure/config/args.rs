use super::app_config::{DeploymentType, LogLevel, PhotosMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "gallery-loader",
    version,
    about = "Index, resolve and preload the photos of a personal gallery",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration overrides.
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Options that override values from the configuration file.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "GALLERY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", env = "GALLERY_LOG_PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "GALLERY_LOG_LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Maximum image fetches running at once.
    #[arg(long, env = "GALLERY_MAX_CONCURRENT_FETCHES", global = true)]
    pub max_concurrent_fetches: Option<usize>,

    /// Deployment type.
    #[arg(long, value_enum, env = "GALLERY_DEPLOYMENT_TYPE", global = true)]
    pub deployment: Option<DeploymentType>,

    /// How photos are served.
    #[arg(long, value_enum, env = "GALLERY_PHOTOS_MODE", global = true)]
    pub photos_mode: Option<PhotosMode>,

    /// API base URL. Empty disables it.
    #[arg(long, env = "GALLERY_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    /// External host serving the photos.
    #[arg(long, env = "GALLERY_EXTERNAL_PHOTOS_URL", global = true)]
    pub external_photos_url: Option<String>,

    /// Directory holding the site's public assets.
    #[arg(long, value_name = "PATH", env = "GALLERY_PUBLIC_ROOT", global = true)]
    pub public_root: Option<PathBuf>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the photos directory and write the photo index.
    Index {
        /// Output file, defaults to the configured index path.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Load every indexed photo through the image coordinator.
    Warm {
        /// Downscale quality in (0, 1).
        #[arg(short, long)]
        quality: Option<f32>,

        /// Print the final coordinator stats as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the URL a photo resolves to.
    Url {
        /// Photo path relative to the photos directory.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_warm_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "gallery-loader",
            "warm",
            "--quality",
            "0.6",
            "--max-concurrent-fetches",
            "5",
            "--json",
        ])
        .unwrap();

        assert!(matches!(
            args.command,
            Command::Warm { quality: Some(q), json: true } if (q - 0.6).abs() < f32::EPSILON
        ));
        assert_eq!(args.overrides.max_concurrent_fetches, Some(5));
    }

    #[test]
    fn test_parse_url() {
        let args =
            CliArgs::try_parse_from(["gallery-loader", "--deployment", "cloud", "url", "a/b.jpg"])
                .unwrap();

        assert!(matches!(args.command, Command::Url { ref path } if path == "a/b.jpg"));
        assert_eq!(args.overrides.deployment, Some(DeploymentType::Cloud));
    }
}
