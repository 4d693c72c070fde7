use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gallery_loader::application::dto::WarmRequest;
use gallery_loader::application::services::ImageCoordinator;
use gallery_loader::application::use_cases::WarmGalleryUseCase;
use gallery_loader::domain::entities::DirectoryNode;
use gallery_loader::infrastructure::config::{AppConfig, CliArgs, Command, StorageManager};
use gallery_loader::infrastructure::photos::{OmitList, PhotoIndexer, PhotoUrlResolver};
use gallery_loader::infrastructure::{JpegCanvas, MemoryBlobStore, SourceFetcher};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &mut CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.overrides.config.as_deref())?;
    config.merge_with_args(std::mem::take(&mut args.overrides));
    Ok(config)
}

fn indexer(config: &AppConfig) -> Result<PhotoIndexer> {
    let omit = OmitList::load(&config.photos.omit_list)?;
    Ok(PhotoIndexer::new(config.photos.photos_dir(), omit))
}

fn read_index(config: &AppConfig) -> Result<DirectoryNode> {
    let path = &config.photos.index_path;
    if !path.exists() {
        warn!(path = ?path, "Photo index not found, scanning photos directory");
        return Ok(indexer(config)?.scan());
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read photo index {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("Malformed photo index {}", path.display()))
}

fn run_index(config: &AppConfig, output: Option<&Path>) -> Result<()> {
    let output = output.unwrap_or(&config.photos.index_path);
    let node = indexer(config)?.write_index(output)?;

    println!("Photo index written to {}", output.display());
    println!("Total photos: {}", node.total_photos);
    for (name, child) in &node.children {
        println!("  {name}: {} photos", child.total_photos);
    }
    Ok(())
}

async fn run_warm(config: &AppConfig, quality: Option<f32>, json: bool) -> Result<()> {
    let index = read_index(config)?;
    let resolver = PhotoUrlResolver::new(&config.photos);
    let ids = index
        .photo_paths()
        .iter()
        .map(|path| resolver.resource_id(path))
        .collect();

    let fetcher = SourceFetcher::new(
        config.photos.public_root.clone(),
        config.images.timeout_secs,
    )?;
    let blobs = Arc::new(MemoryBlobStore::new());
    let coordinator = ImageCoordinator::new(
        config.images.coordinator_config(),
        Arc::new(fetcher),
        Arc::new(JpegCanvas),
        blobs.clone(),
    );

    let mut request = WarmRequest::new(ids);
    if let Some(quality) = quality.or(config.images.default_downscale_quality) {
        request = request.with_downscale_quality(quality);
    }

    let report = WarmGalleryUseCase::new(coordinator.clone())
        .execute(request)
        .await;

    for error in &report.failed {
        println!("failed: {error}");
    }
    println!("{report}");
    if json {
        println!("{}", serde_json::to_string_pretty(&report.stats)?);
    } else {
        println!("{}", report.stats);
    }
    println!("{}", blobs.stats());

    coordinator.clear_all();

    if !report.is_complete() {
        bail!("{} images failed to load", report.failed.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let mut args = CliArgs::parse();
    let config = load_config(&mut args)?;

    init_logging(&config)?;
    info!(version = gallery_loader::VERSION, "Starting {}", gallery_loader::NAME);

    match args.command {
        Command::Index { output } => run_index(&config, output.as_deref()),
        Command::Warm { quality, json } => run_warm(&config, quality, json).await,
        Command::Url { path } => {
            println!("{}", PhotoUrlResolver::new(&config.photos).photo_url(&path));
            Ok(())
        }
    }
}
