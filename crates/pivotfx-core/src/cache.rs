//! Time-bounded in-memory key/value store.
//!
//! Every entry carries an absolute expiry instant. Reads filter expired
//! entries lazily, so a lagging sweep never exposes stale values; the
//! background sweeper only exists to reclaim memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Upper bound applied when `now + ttl` would overflow the clock.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

#[derive(Debug)]
struct StoreInner<V> {
    map: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> StoreInner<V> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn get(&self, key: &str, now: Instant) -> Option<V> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    fn put(&mut self, key: String, value: V, ttl: Duration, now: Instant) {
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + MAX_TTL.min(ttl));
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        before - self.map.len()
    }

    fn stats(&self, now: Instant) -> StoreStats {
        let total = self.map.len();
        let live = self.map.values().filter(|entry| entry.is_live(now)).count();
        StoreStats {
            total_entries: total,
            live_entries: live,
            expired_entries: total - live,
        }
    }
}

/// Entry counts at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
}

/// Thread-safe TTL store shared by cloning the handle.
///
/// Writers (`set`, `remove`, `sweep`) take the exclusive side of the lock,
/// readers take the shared side.
#[derive(Debug)]
pub struct TtlStore<V> {
    label: &'static str,
    default_ttl: Duration,
    inner: Arc<RwLock<StoreInner<V>>>,
}

impl<V> Clone for TtlStore<V> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            default_ttl: self.default_ttl,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TtlStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty store. `label` names it in logs and diagnostics.
    pub fn new(label: &'static str, default_ttl: Duration) -> Self {
        Self {
            label,
            default_ttl,
            inner: Arc::new(RwLock::new(StoreInner::new())),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert or replace `key`, expiring `ttl` from now.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut store = self.inner.write().await;
        store.put(key.into(), value, ttl, Instant::now());
    }

    /// Insert or replace `key` using the store's default TTL.
    pub async fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.default_ttl).await;
    }

    /// Get a value if the key exists and has not expired.
    ///
    /// Expired entries are reported as absent whether or not a sweep has
    /// already removed them.
    pub async fn get(&self, key: &str) -> Option<V> {
        let value = {
            let store = self.inner.read().await;
            store.get(key, Instant::now())
        };
        debug!(
            store = self.label,
            key,
            hit = value.is_some(),
            "cache lookup"
        );
        value
    }

    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut store = self.inner.write().await;
        store.map.remove(key).map(|entry| entry.value)
    }

    /// Physically remove expired entries, returning how many were dropped.
    pub async fn sweep(&self) -> usize {
        let mut store = self.inner.write().await;
        let removed = store.clear_expired(Instant::now());
        if removed > 0 {
            debug!(store = self.label, removed, "swept expired entries");
        }
        removed
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }

    pub async fn stats(&self) -> StoreStats {
        self.inner.read().await.stats(Instant::now())
    }

    /// Start the background eviction task on a fixed tick.
    ///
    /// The task runs until [`SweeperHandle::shutdown`] is awaited or the
    /// handle is dropped. Must be called from within a tokio runtime.
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        let interval = interval.max(Duration::from_millis(1));
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let store = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        store.sweep().await;
                    }
                }
            }
            debug!(store = store.label, "sweeper stopped");
        });

        SweeperHandle {
            label: self.label,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running sweep task.
///
/// Dropping the handle signals the task to stop; [`Self::shutdown`] also
/// waits for it to finish.
#[derive(Debug)]
pub struct SweeperHandle {
    label: &'static str,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub async fn shutdown(mut self) {
        self.signal_stop();
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(store = self.label, %error, "sweeper task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn signal_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone; nothing to signal then.
            let _ = stop.send(());
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
