use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::granularity::{self, Decision};
use super::observer::ProgressObserver;
use super::poster::CallbackPoster;

/// One registration: the observer plus the last bucket it was told about.
///
/// Keeping the bucket inside the entry means it is always cleared together
/// with the observer.
struct RegistryEntry {
    /// Distinguishes successive registrations for the same URL.
    generation: u64,
    observer: Arc<dyn ProgressObserver>,
    last_bucket: Option<u64>,
}

/// Directory of progress observers keyed by request URL.
///
/// Shared by every in-flight download. At most one observer is registered
/// per URL; registering again replaces the previous observer and its bucket
/// state. Observer invocations are never made inline: they are posted to the
/// `CallbackPoster` the registry was built with.
pub struct ProgressRegistry {
    entries: Mutex<HashMap<String, RegistryEntry>>,
    next_generation: AtomicU64,
    poster: Arc<dyn CallbackPoster>,
}

impl ProgressRegistry {
    pub fn new(poster: impl CallbackPoster) -> Self {
        Self::with_poster(Arc::new(poster))
    }

    pub fn with_poster(poster: Arc<dyn CallbackPoster>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            poster,
        }
    }

    /// Observer code never runs under this lock, so a poisoned guard still
    /// holds a consistent map.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `observer` for `url`, replacing any earlier registration.
    pub fn expect(&self, url: impl Into<String>, observer: Arc<dyn ProgressObserver>) {
        let url = url.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        log::debug!("[ProgressRegistry] expect url={}", url);
        let previous = self.entries().insert(
            url,
            RegistryEntry {
                generation,
                observer,
                last_bucket: None,
            },
        );
        // Dropped outside the lock: an observer's Drop may call back in.
        drop(previous);
    }

    /// Stop tracking `url`. No-op when nothing is registered.
    ///
    /// Safe to call from inside an observer callback.
    pub fn forget(&self, url: &str) {
        let removed = self.entries().remove(url);
        if removed.is_some() {
            log::debug!("[ProgressRegistry] forget url={}", url);
        }
    }

    /// Whether an observer is currently registered for `url`.
    pub fn is_expected(&self, url: &str) -> bool {
        self.entries().contains_key(url)
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Report that `bytes_read` bytes of the body for `url` have been consumed.
    ///
    /// Returns immediately when nobody is registered for `url`. Reaching
    /// `total_bytes` unregisters the observer; it still receives that final
    /// report.
    pub fn dispatch(&self, url: &str, bytes_read: u64, total_bytes: Option<u64>) {
        let (generation, observer) = match self.entries().get(url) {
            Some(entry) => (entry.generation, Arc::clone(&entry.observer)),
            None => return,
        };

        // Queried without holding the lock so the observer may use the registry.
        let percent = observer.granularity_percent();
        let complete = total_bytes.is_some_and(|total| total <= bytes_read);

        let decision = {
            let mut entries = self.entries();
            let entry = match entries.get_mut(url) {
                Some(entry) if entry.generation == generation => entry,
                // Forgotten or replaced while we asked for the granularity.
                _ => return,
            };
            // A completing report is judged as if nothing had been delivered yet,
            // so it always reaches the observer.
            let last_bucket = if complete { None } else { entry.last_bucket };
            let decision = granularity::needs_dispatch(
                last_bucket,
                bytes_read,
                total_bytes,
                percent,
            );
            if complete {
                entries.remove(url);
                log::debug!(
                    "[ProgressRegistry] url={} complete at {} bytes, forgetting",
                    url,
                    bytes_read
                );
            } else if let Decision {
                dispatch: true,
                bucket: Some(bucket),
            } = decision
            {
                entry.last_bucket = Some(bucket);
            }
            decision
        };

        if !decision.dispatch {
            return;
        }
        log::trace!(
            "[ProgressRegistry] url={} dispatch {}/{:?} bucket={:?}",
            url,
            bytes_read,
            total_bytes,
            decision.bucket
        );
        self.poster.post(Box::pin(async move {
            observer.on_progress(bytes_read, total_bytes).await;
        }));
    }
}
