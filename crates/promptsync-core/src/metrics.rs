//! Global atomic counters for promptsync observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    deploys_committed: AtomicU64,
    cache_refreshes: AtomicU64,
    cache_refresh_failures: AtomicU64,
    mirror_files_written: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            deploys_committed: AtomicU64::new(0),
            cache_refreshes: AtomicU64::new(0),
            cache_refresh_failures: AtomicU64::new(0),
            mirror_files_written: AtomicU64::new(0),
        }
    }

    /// Increment the deploys-committed counter by one.
    pub fn inc_deploys(&self) {
        self.deploys_committed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deploys_committed", "counter incremented");
    }

    /// Increment the cache-refreshes counter by one.
    pub fn inc_cache_refreshes(&self) {
        self.cache_refreshes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cache_refreshes", "counter incremented");
    }

    /// Increment the cache-refresh-failures counter by one.
    pub fn inc_cache_refresh_failures(&self) {
        self.cache_refresh_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cache_refresh_failures", "counter incremented");
    }

    /// Add `n` to the mirror-files-written counter.
    pub fn add_mirror_files(&self, n: u64) {
        self.mirror_files_written.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "mirror_files_written", n = n, "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            deploys_committed = self.deploys_committed(),
            cache_refreshes = self.cache_refreshes(),
            cache_refresh_failures = self.cache_refresh_failures(),
            mirror_files_written = self.mirror_files_written(),
        );
    }

    pub fn deploys_committed(&self) -> u64 {
        self.deploys_committed.load(Ordering::Relaxed)
    }

    pub fn cache_refreshes(&self) -> u64 {
        self.cache_refreshes.load(Ordering::Relaxed)
    }

    pub fn cache_refresh_failures(&self) -> u64 {
        self.cache_refresh_failures.load(Ordering::Relaxed)
    }

    pub fn mirror_files_written(&self) -> u64 {
        self.mirror_files_written.load(Ordering::Relaxed)
    }
}
