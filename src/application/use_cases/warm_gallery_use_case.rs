//! Gallery warm-up use case.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::application::dto::{WarmReport, WarmRequest};
use crate::application::services::ImageCoordinator;
use crate::domain::entities::{LoadStatus, Rendition, StatusSnapshot};
use crate::domain::ports::{ObserverRef, StatusObserver};

/// Counts settled loads as they are reported.
#[derive(Default)]
struct ProgressObserver {
    settled: AtomicUsize,
    fallbacks: AtomicUsize,
    total: usize,
}

impl StatusObserver for ProgressObserver {
    fn on_status(&self, snapshot: &StatusSnapshot) {
        if !snapshot.is_settled() {
            return;
        }
        if snapshot.rendition == Some(Rendition::FellBackToOriginal) {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        let done = self.settled.fetch_add(1, Ordering::Relaxed) + 1;
        if snapshot.status == LoadStatus::Failed {
            debug!(done, total = self.total, "Image failed to load");
        } else {
            debug!(done, total = self.total, "Image loaded");
        }
    }
}

/// Preloads a batch of images through the coordinator.
#[derive(Clone)]
pub struct WarmGalleryUseCase {
    coordinator: ImageCoordinator,
}

impl WarmGalleryUseCase {
    /// Creates new warm-up use case.
    #[must_use]
    pub const fn new(coordinator: ImageCoordinator) -> Self {
        Self { coordinator }
    }

    /// Requests every image and waits for all of them to settle.
    ///
    /// Individual failures are collected in the report rather than aborting the run.
    pub async fn execute(&self, request: WarmRequest) -> WarmReport {
        info!(count = request.ids.len(), "Warming gallery");

        let progress = Arc::new(ProgressObserver {
            total: request.ids.len(),
            ..ProgressObserver::default()
        });
        let observer: ObserverRef = progress.clone();
        for id in &request.ids {
            self.coordinator.subscribe(id, observer.clone());
        }

        let loads = request
            .ids
            .iter()
            .map(|id| self.coordinator.request_load(id, request.options));
        let results = join_all(loads).await;

        for id in &request.ids {
            self.coordinator.unsubscribe(id, &observer);
        }

        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in request.ids.into_iter().zip(results) {
            match result {
                Ok(handle) => loaded.push((id, handle)),
                Err(e) => {
                    warn!(error = %e, "Failed to warm image");
                    failed.push(e);
                }
            }
        }

        let report = WarmReport {
            loaded,
            failed,
            fallbacks: progress.fallbacks.load(Ordering::Relaxed),
            stats: self.coordinator.stats(),
        };
        info!(%report, "Gallery warm-up finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CoordinatorConfig;
    use crate::domain::entities::{ResourceHandle, ResourceId};
    use crate::domain::ports::mocks::{FailingCanvas, MockImageFetcher};
    use crate::infrastructure::image::{JpegCanvas, MemoryBlobStore};

    fn ids(names: &[&str]) -> Vec<ResourceId> {
        names.iter().map(|n| ResourceId::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_warm_collects_successes_and_failures() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let coordinator = ImageCoordinator::new(
            CoordinatorConfig::default(),
            fetcher.clone(),
            Arc::new(JpegCanvas),
            Arc::new(MemoryBlobStore::new()),
        );
        fetcher.fail(&ResourceId::new("b.jpg"));

        let use_case = WarmGalleryUseCase::new(coordinator.clone());
        let report = use_case
            .execute(WarmRequest::new(ids(&["a.jpg", "b.jpg", "c.jpg"])))
            .await;

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id(), &ResourceId::new("b.jpg"));
        assert!(!report.is_complete());
        assert_eq!(report.stats.loaded, 2);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(
            report.loaded[0],
            (
                ResourceId::new("a.jpg"),
                ResourceHandle::Original(ResourceId::new("a.jpg"))
            )
        );
    }

    #[tokio::test]
    async fn test_warm_counts_downscale_fallbacks() {
        let fetcher = Arc::new(MockImageFetcher::new().with_dimensions(1000, 1000));
        let coordinator = ImageCoordinator::new(
            CoordinatorConfig {
                max_concurrent_fetches: 1,
            },
            fetcher,
            Arc::new(FailingCanvas),
            Arc::new(MemoryBlobStore::new()),
        );

        let report = WarmGalleryUseCase::new(coordinator)
            .execute(WarmRequest::new(ids(&["a.jpg", "b.jpg"])).with_downscale_quality(0.5))
            .await;

        assert!(report.is_complete());
        assert_eq!(report.fallbacks, 2);
    }

    #[tokio::test]
    async fn test_warm_leaves_no_observers_behind() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let coordinator = ImageCoordinator::new(
            CoordinatorConfig::default(),
            fetcher,
            Arc::new(JpegCanvas),
            Arc::new(MemoryBlobStore::new()),
        );

        WarmGalleryUseCase::new(coordinator.clone())
            .execute(WarmRequest::new(ids(&["a.jpg"])))
            .await;

        // A fresh subscriber only sees the replayed snapshot, not warm-up traffic.
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        coordinator.subscribe(
            &ResourceId::new("a.jpg"),
            Arc::new(move |_: &StatusSnapshot| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }
}
