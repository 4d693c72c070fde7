//! Image fetcher reading from HTTP or the local public directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::domain::entities::{FetchedImage, ResourceId};
use crate::domain::errors::FetchError;
use crate::domain::ports::ImageFetchPort;

/// Fetches `http(s)://` identifiers over the network and everything else
/// from the public root directory, then decodes the bytes.
pub struct SourceFetcher {
    http_client: reqwest::Client,
    public_root: PathBuf,
}

impl std::fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFetcher")
            .field("public_root", &self.public_root)
            .finish_non_exhaustive()
    }
}

impl SourceFetcher {
    /// Creates a fetcher serving local paths from `public_root`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(public_root: PathBuf, timeout_secs: u64) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            public_root,
        })
    }

    /// Maps a site-relative path such as `/assets/photos/a.jpg` onto the public root.
    ///
    /// # Errors
    /// Returns error if the path tries to escape the public root.
    pub fn local_path(&self, id: &ResourceId) -> Result<PathBuf, FetchError> {
        let relative = Path::new(id.as_str().trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidPath(id.to_string()));
        }
        Ok(self.public_root.join(relative))
    }

    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read body: {e}")))
    }

    async fn read_local(&self, id: &ResourceId) -> Result<Bytes, FetchError> {
        let path = self.local_path(id)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(FetchError::Io(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Decodes image bytes on a blocking thread.
///
/// # Errors
/// Returns error if the bytes are not a supported image.
pub async fn decode(bytes: Bytes) -> Result<FetchedImage, FetchError> {
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| FetchError::Panicked(format!("Decode task panicked: {e}")))?
        .map_err(|e| FetchError::Decode(format!("Failed to decode image: {e}")))?;

    Ok(FetchedImage::new(decoded))
}

#[async_trait]
impl ImageFetchPort for SourceFetcher {
    async fn fetch(&self, id: &ResourceId) -> Result<FetchedImage, FetchError> {
        let bytes = if id.is_remote() {
            debug!(id = %id, "Downloading image from network");
            self.download(id.as_str()).await?
        } else {
            debug!(id = %id, "Reading image from public directory");
            self.read_local(id).await?
        };

        let fetched = decode(bytes).await?;
        debug!(
            id = %id,
            width = fetched.width(),
            height = fetched.height(),
            "Image decoded"
        );
        Ok(fetched)
    }
}
