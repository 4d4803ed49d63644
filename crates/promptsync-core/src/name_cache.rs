//! TTL-bound cache of LIVE prompt names.
//!
//! Owned by whoever registers the tools (see [`crate::tools::PromptTools`])
//! and shared through an `Arc`. Every update swaps in a whole new snapshot,
//! so readers never observe a half-written list.
//!
//! Lifecycle:
//! - empty at construction
//! - [`NameCache::refresh`] on registration
//! - lazy refresh from [`NameCache::read`] once older than the TTL
//! - [`NameCache::invalidate`] after every successful deploy
//!
//! A failed refresh logs a warning and keeps the previous snapshot:
//! stale-but-available beats empty.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use prompt_store::{PromptStore, Target};
use tokio::time::Instant;

use crate::metrics::METRICS;
use crate::obs::{emit_cache_refresh_failed, emit_cache_refreshed};

/// Default time-to-live for cached names.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Snapshot {
    names: Vec<String>,
    last_updated: Option<Instant>,
}

/// Process-local cache of known prompt paths.
pub struct NameCache {
    store: Arc<dyn PromptStore>,
    ttl: Duration,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl NameCache {
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn PromptStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, names: Vec<String>) {
        let next = Arc::new(Snapshot {
            names,
            last_updated: Some(Instant::now()),
        });
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// When the cache was last populated, if ever.
    pub fn last_updated(&self) -> Option<Instant> {
        self.current().last_updated
    }

    /// True when never populated or older than the TTL.
    pub fn is_stale(&self) -> bool {
        match self.current().last_updated {
            None => true,
            Some(at) => at.elapsed() > self.ttl,
        }
    }

    /// Cached names, refreshing first when stale. Never fails.
    pub async fn read(&self) -> Vec<String> {
        if self.is_stale() {
            self.refresh().await;
        }
        self.current().names.clone()
    }

    /// Cached names without touching the store.
    pub fn peek(&self) -> Vec<String> {
        self.current().names.clone()
    }

    /// Replace the cache with the authoritative LIVE listing.
    ///
    /// Failures are logged and swallowed; the previous names stay in place.
    pub async fn refresh(&self) {
        match self.store.list_documents(&Target::Live).await {
            Ok(docs) => {
                let names: Vec<String> = docs.into_iter().map(|d| d.path).collect();
                emit_cache_refreshed(names.len());
                METRICS.inc_cache_refreshes();
                self.replace(names);
            }
            Err(e) => {
                emit_cache_refresh_failed(&e);
                METRICS.inc_cache_refresh_failures();
            }
        }
    }

    /// Record a listing obtained elsewhere (e.g. by `list_prompts`).
    pub fn record(&self, names: Vec<String>) {
        self.replace(names);
    }

    /// Called after a successful deploy. Refreshes immediately rather than
    /// clearing, so readers never see a transient empty list.
    pub async fn invalidate(&self) {
        self.refresh().await;
    }
}

impl std::fmt::Debug for NameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current();
        f.debug_struct("NameCache")
            .field("ttl", &self.ttl)
            .field("names", &snapshot.names)
            .field("last_updated", &snapshot.last_updated)
            .finish()
    }
}
