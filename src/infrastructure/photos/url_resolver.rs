//! Maps photo paths to the URL the site serves them from.

use crate::domain::entities::ResourceId;
use crate::infrastructure::config::{DeploymentType, PhotosConfig, PhotosMode};

/// Resolves photo paths relative to the photos directory into URLs.
#[derive(Debug, Clone)]
pub struct PhotoUrlResolver {
    deployment: DeploymentType,
    mode: PhotosMode,
    api_base_url: Option<String>,
    local_photos_path: String,
    external_photos_url: Option<String>,
}

impl PhotoUrlResolver {
    /// Creates a resolver from the photo configuration.
    #[must_use]
    pub fn new(config: &PhotosConfig) -> Self {
        Self {
            deployment: config.deployment,
            mode: config.mode,
            api_base_url: config.api_base_url.clone().filter(|url| !url.is_empty()),
            local_photos_path: config.local_photos_path.clone(),
            external_photos_url: config
                .external_photos_url
                .clone()
                .filter(|url| !url.is_empty()),
        }
    }

    /// Returns the URL for `photo_path`.
    ///
    /// An external host wins over everything. Cloud deployments and static
    /// mode serve from the local photos path; otherwise the API base is
    /// prepended when one is configured.
    #[must_use]
    pub fn photo_url(&self, photo_path: &str) -> String {
        if let Some(external) = &self.external_photos_url {
            return format!("{external}/{photo_path}");
        }

        let local = format!("{}/{photo_path}", self.local_photos_path);
        if self.deployment == DeploymentType::Cloud || self.mode == PhotosMode::Static {
            return local;
        }

        match &self.api_base_url {
            Some(api) => format!("{api}{local}"),
            None => local,
        }
    }

    /// Returns the photo URL as a load identifier.
    #[must_use]
    pub fn resource_id(&self, photo_path: &str) -> ResourceId {
        ResourceId::new(self.photo_url(photo_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn resolver(
        deployment: DeploymentType,
        mode: PhotosMode,
        api: Option<&str>,
        external: Option<&str>,
    ) -> PhotoUrlResolver {
        PhotoUrlResolver::new(&PhotosConfig {
            deployment,
            mode,
            api_base_url: api.map(ToString::to_string),
            external_photos_url: external.map(ToString::to_string),
            ..PhotosConfig::default()
        })
    }

    #[test_case(DeploymentType::Local, PhotosMode::Filesystem, Some("http://localhost:8090"), None,
        "http://localhost:8090/assets/photos/trips/a.jpg" ; "local with api")]
    #[test_case(DeploymentType::Local, PhotosMode::Filesystem, None, None,
        "/assets/photos/trips/a.jpg" ; "local without api")]
    #[test_case(DeploymentType::Local, PhotosMode::Filesystem, Some(""), None,
        "/assets/photos/trips/a.jpg" ; "empty api is ignored")]
    #[test_case(DeploymentType::Cloud, PhotosMode::Filesystem, Some("http://localhost:8090"), None,
        "/assets/photos/trips/a.jpg" ; "cloud ignores api")]
    #[test_case(DeploymentType::Local, PhotosMode::Static, Some("http://localhost:8090"), None,
        "/assets/photos/trips/a.jpg" ; "static ignores api")]
    #[test_case(DeploymentType::Cloud, PhotosMode::Static, Some("http://localhost:8090"), Some("https://cdn.example.com/p"),
        "https://cdn.example.com/p/trips/a.jpg" ; "external wins")]
    fn test_photo_url(
        deployment: DeploymentType,
        mode: PhotosMode,
        api: Option<&str>,
        external: Option<&str>,
        expected: &str,
    ) {
        assert_eq!(
            resolver(deployment, mode, api, external).photo_url("trips/a.jpg"),
            expected
        );
    }

    #[test]
    fn test_resource_id_marks_remote_urls() {
        let remote = resolver(DeploymentType::Local, PhotosMode::Filesystem, Some("http://localhost:8090"), None);
        let local = resolver(DeploymentType::Cloud, PhotosMode::Filesystem, None, None);

        assert!(remote.resource_id("a.jpg").is_remote());
        assert!(!local.resource_id("a.jpg").is_remote());
    }
}
