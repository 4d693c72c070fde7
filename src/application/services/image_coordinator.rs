//! Image load coordinator.
//!
//! Owns the cache table, a FIFO work queue drained by at most
//! `max_concurrent_fetches` tasks, and the per-identifier observer registry.
//! All bookkeeping happens under one lock that is never held across an
//! `.await` or while observers run.

use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{
    LoadOptions, LoadStatus, Rendition, ResourceHandle, ResourceId, StatusSnapshot,
};
use crate::domain::errors::{FetchError, LoadError};
use crate::domain::ports::{
    BlobStorePort, CanvasPort, ImageFetchPort, ObserverRef, same_observer,
};

use super::downscale::{DownscaleOutcome, downscale};

/// Default cap on fetches running at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 3;

/// Outcome delivered to every waiter of a load.
pub type LoadResult = Result<ResourceHandle, LoadError>;

/// Cloneable future shared by every caller waiting on the same load.
pub type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

/// Configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum fetches running at once. Zero is treated as one.
    pub max_concurrent_fetches: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl CoordinatorConfig {
    fn concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }
}

/// Point-in-time counters of the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Entries in the cache table.
    pub total_cached: usize,
    /// Entries waiting on a fetch.
    pub pending: usize,
    /// Entries with a handle.
    pub loaded: usize,
    /// Entries whose load failed.
    pub failed: usize,
    /// Tasks waiting for a fetch slot.
    pub queue_length: usize,
    /// Fetches currently running.
    pub active_fetches: usize,
}

impl std::fmt::Display for CoordinatorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Images: {} cached ({} loaded, {} pending, {} failed), {} queued, {} fetching",
            self.total_cached,
            self.loaded,
            self.pending,
            self.failed,
            self.queue_length,
            self.active_fetches
        )
    }
}

struct CacheEntry {
    /// Load cycle this entry belongs to. Completions from other cycles are stale.
    cycle: u64,
    status: LoadStatus,
    handle: Option<ResourceHandle>,
    error: Option<LoadError>,
    rendition: Option<Rendition>,
    in_flight: Option<LoadFuture>,
}

impl CacheEntry {
    fn pending(cycle: u64, in_flight: LoadFuture) -> Self {
        Self {
            cycle,
            status: LoadStatus::Pending,
            handle: None,
            error: None,
            rendition: None,
            in_flight: Some(in_flight),
        }
    }

    fn settle(&mut self, outcome: &Result<Loaded, LoadError>) {
        self.in_flight = None;
        match outcome {
            Ok(loaded) => {
                self.status = LoadStatus::Loaded;
                self.handle = Some(loaded.handle.clone());
                self.rendition = Some(loaded.rendition);
            }
            Err(e) => {
                self.status = LoadStatus::Failed;
                self.error = Some(e.clone());
            }
        }
    }

    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            handle: self.handle.clone(),
            error: self.error.clone(),
            rendition: self.rendition,
        }
    }
}

struct Loaded {
    handle: ResourceHandle,
    rendition: Rendition,
}

struct LoadTask {
    id: ResourceId,
    options: LoadOptions,
    cycle: u64,
    completion: oneshot::Sender<LoadResult>,
}

#[derive(Default)]
struct CoordinatorState {
    entries: HashMap<ResourceId, CacheEntry>,
    observers: HashMap<ResourceId, Vec<ObserverRef>>,
    queue: VecDeque<LoadTask>,
    active_fetches: usize,
    next_cycle: u64,
}

impl CoordinatorState {
    fn observers_of(&self, id: &ResourceId) -> Vec<ObserverRef> {
        self.observers.get(id).cloned().unwrap_or_default()
    }

    fn is_current(&self, id: &ResourceId, cycle: u64) -> bool {
        self.entries.get(id).is_some_and(|e| e.cycle == cycle)
    }

    /// Pops tasks in arrival order while fetch slots are free.
    fn take_ready(&mut self, limit: usize) -> Vec<LoadTask> {
        let mut ready = Vec::new();
        while self.active_fetches < limit {
            let Some(task) = self.queue.pop_front() else {
                break;
            };
            self.active_fetches += 1;
            ready.push(task);
        }
        ready
    }
}

struct Inner {
    config: CoordinatorConfig,
    fetcher: Arc<dyn ImageFetchPort>,
    canvas: Arc<dyn CanvasPort>,
    blobs: Arc<dyn BlobStorePort>,
    state: Mutex<CoordinatorState>,
}

impl Inner {
    async fn load(&self, id: &ResourceId, options: LoadOptions) -> Result<Loaded, LoadError> {
        let fetched = self
            .fetcher
            .fetch(id)
            .await
            .map_err(|reason| LoadError::failed(id, reason))?;

        let Some(quality) = options.effective_quality() else {
            return Ok(Loaded {
                handle: ResourceHandle::Original(id.clone()),
                rendition: Rendition::Original,
            });
        };

        match downscale(self.canvas.clone(), self.blobs.as_ref(), &fetched, quality).await {
            DownscaleOutcome::Resized(handle) => Ok(Loaded {
                handle,
                rendition: Rendition::Resized,
            }),
            DownscaleOutcome::FellBackToOriginal(e) => {
                warn!(id = %id, error = %e, "Downscale failed, using original image");
                Ok(Loaded {
                    handle: ResourceHandle::Original(id.clone()),
                    rendition: Rendition::FellBackToOriginal,
                })
            }
        }
    }

    fn release(&self, handle: Option<&ResourceHandle>) {
        if let Some(ResourceHandle::Transient(url)) = handle {
            self.blobs.revoke(url);
        }
    }
}

/// Deduplicating, bounded image loader with a subscribe/notify interface.
///
/// Cheap to clone; clones share the same cache. Loads are executed with
/// `tokio::spawn`, so [`ImageCoordinator::request_load`] must be called
/// from within a Tokio runtime.
#[derive(Clone)]
pub struct ImageCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ImageCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCoordinator")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ImageCoordinator {
    /// Creates a coordinator over the given platform ports.
    #[must_use]
    pub fn new(
        config: CoordinatorConfig,
        fetcher: Arc<dyn ImageFetchPort>,
        canvas: Arc<dyn CanvasPort>,
        blobs: Arc<dyn BlobStorePort>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                fetcher,
                canvas,
                blobs,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    /// Registers `observer` for status changes of `id`.
    ///
    /// If an entry already exists its current snapshot is delivered
    /// immediately. Registering the same observer twice has no effect.
    pub fn subscribe(&self, id: &ResourceId, observer: ObserverRef) {
        let snapshot = {
            let mut state = self.inner.state.lock();
            let set = state.observers.entry(id.clone()).or_default();
            if !set.iter().any(|o| same_observer(o, &observer)) {
                set.push(observer.clone());
            }
            state.entries.get(id).map(CacheEntry::snapshot)
        };

        if let Some(snapshot) = snapshot {
            deliver(&observer, &snapshot);
        }
    }

    /// Removes `observer` from `id`. Unknown observers are ignored.
    pub fn unsubscribe(&self, id: &ResourceId, observer: &ObserverRef) {
        let mut state = self.inner.state.lock();
        let emptied = state.observers.get_mut(id).is_some_and(|set| {
            set.retain(|o| !same_observer(o, observer));
            set.is_empty()
        });
        if emptied {
            state.observers.remove(id);
        }
    }

    /// Requests `id`, returning a future shared by every caller of the same load.
    ///
    /// Loaded entries resolve immediately, pending entries return the
    /// in-flight future. Absent and failed entries start a new load cycle.
    pub fn request_load(&self, id: &ResourceId, options: LoadOptions) -> LoadFuture {
        let (cycle, completion, in_flight, observers) = {
            let mut state = self.inner.state.lock();
            match state.entries.get(id) {
                Some(entry) if entry.status == LoadStatus::Loaded => {
                    if let Some(handle) = &entry.handle {
                        trace!(id = %id, "Image cache hit");
                        return future::ready::<LoadResult>(Ok(handle.clone()))
                            .boxed()
                            .shared();
                    }
                }
                Some(entry) if entry.status == LoadStatus::Pending => {
                    if let Some(in_flight) = &entry.in_flight {
                        trace!(id = %id, "Joining in-flight load");
                        return in_flight.clone();
                    }
                }
                Some(entry) if entry.status == LoadStatus::Failed => {
                    debug!(id = %id, "Retrying failed image");
                }
                Some(entry) => {
                    warn!(id = %id, status = %entry.status, "Restarting incomplete cache entry");
                }
                None => {}
            }

            let cycle = state.next_cycle;
            state.next_cycle += 1;

            let (completion, receiver) = oneshot::channel();
            let cancelled = LoadError::Cancelled { id: id.clone() };
            let in_flight = async move { receiver.await.unwrap_or(Err(cancelled)) }
                .boxed()
                .shared();

            state
                .entries
                .insert(id.clone(), CacheEntry::pending(cycle, in_flight.clone()));
            (cycle, completion, in_flight, state.observers_of(id))
        };

        notify(&observers, &StatusSnapshot::pending());

        // Queued only after observers saw Pending, so no completion can overtake it.
        let ready = {
            let mut state = self.inner.state.lock();
            if state.is_current(id, cycle) {
                state.queue.push_back(LoadTask {
                    id: id.clone(),
                    options,
                    cycle,
                    completion,
                });
                debug!(id = %id, cycle, queued = state.queue.len(), "Queued image load");
                state.take_ready(self.inner.config.concurrency())
            } else {
                debug!(id = %id, "Image evicted before it was queued");
                Vec::new()
            }
        };
        self.dispatch(ready);

        in_flight
    }

    /// Evicts `id`, revoking its transient handle and dropping its observers.
    ///
    /// Observers are not notified. A load still running for `id` completes
    /// for its waiters without touching the cache.
    pub fn clear_image(&self, id: &ResourceId) {
        let removed = {
            let mut state = self.inner.state.lock();
            state.observers.remove(id);
            state.entries.remove(id)
        };

        if let Some(entry) = removed {
            debug!(id = %id, status = %entry.status, "Evicted image");
            self.inner.release(entry.handle.as_ref());
        }
    }

    /// Evicts everything and empties the queue.
    ///
    /// Queued loads settle with [`LoadError::Cancelled`]. Running fetches
    /// finish and still resolve their waiters, but are not cached.
    pub fn clear_all(&self) {
        let (entries, queue) = {
            let mut state = self.inner.state.lock();
            state.observers.clear();
            (
                std::mem::take(&mut state.entries),
                std::mem::take(&mut state.queue),
            )
        };

        for entry in entries.values() {
            self.inner.release(entry.handle.as_ref());
        }
        info!(
            entries = entries.len(),
            queued = queue.len(),
            "Cleared image cache"
        );
    }

    /// Returns the current snapshot of `id`, if cached.
    #[must_use]
    pub fn snapshot(&self, id: &ResourceId) -> Option<StatusSnapshot> {
        self.inner.state.lock().entries.get(id).map(CacheEntry::snapshot)
    }

    /// Returns cache and queue counters.
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        let state = self.inner.state.lock();
        let mut stats = CoordinatorStats {
            total_cached: state.entries.len(),
            queue_length: state.queue.len(),
            active_fetches: state.active_fetches,
            ..CoordinatorStats::default()
        };
        for entry in state.entries.values() {
            match entry.status {
                LoadStatus::Pending => stats.pending += 1,
                LoadStatus::Loaded => stats.loaded += 1,
                LoadStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    fn dispatch(&self, ready: Vec<LoadTask>) {
        for task in ready {
            let coordinator = self.clone();
            tokio::spawn(async move { coordinator.run(task).await });
        }
    }

    async fn run(self, task: LoadTask) {
        let LoadTask {
            id,
            options,
            cycle,
            completion,
        } = task;
        debug!(id = %id, cycle, "Fetching image");

        let inner = self.inner.clone();
        let load_id = id.clone();
        let outcome = match tokio::spawn(async move { inner.load(&load_id, options).await }).await
        {
            Ok(outcome) => outcome,
            Err(e) => Err(LoadError::failed(
                &id,
                FetchError::Panicked(format!("Load task failed: {e}")),
            )),
        };

        self.complete(&id, cycle, outcome, completion);
    }

    fn complete(
        &self,
        id: &ResourceId,
        cycle: u64,
        outcome: Result<Loaded, LoadError>,
        completion: oneshot::Sender<LoadResult>,
    ) {
        let (committed, observers, ready) = {
            let mut state = self.inner.state.lock();
            state.active_fetches = state.active_fetches.saturating_sub(1);

            let committed = state.entries.get_mut(id).and_then(|entry| {
                (entry.cycle == cycle).then(|| {
                    entry.settle(&outcome);
                    entry.snapshot()
                })
            });
            let observers = if committed.is_some() {
                state.observers_of(id)
            } else {
                Vec::new()
            };
            let ready = state.take_ready(self.inner.config.concurrency());
            (committed, observers, ready)
        };
        self.dispatch(ready);

        let result = if let Some(snapshot) = committed {
            debug!(id = %id, status = %snapshot.status, "Image load settled");
            notify(&observers, &snapshot);
            outcome.map(|loaded| loaded.handle)
        } else {
            debug!(id = %id, cycle, "Load finished after eviction, not caching");
            outcome.map(|loaded| match loaded.handle {
                ResourceHandle::Transient(url) => {
                    // Nothing owns the copy any more.
                    self.inner.blobs.revoke(&url);
                    ResourceHandle::Original(id.clone())
                }
                original @ ResourceHandle::Original(_) => original,
            })
        };

        // Every waiter may have gone away.
        let _ = completion.send(result);
    }
}

fn notify(observers: &[ObserverRef], snapshot: &StatusSnapshot) {
    for observer in observers {
        deliver(observer, snapshot);
    }
}

/// Runs one observer, containing a panic so bookkeeping around it still happens.
fn deliver(observer: &ObserverRef, snapshot: &StatusSnapshot) {
    let call = AssertUnwindSafe(|| observer.on_status(snapshot));
    if std::panic::catch_unwind(call).is_err() {
        warn!(status = %snapshot.status, "Status observer panicked");
    }
}
