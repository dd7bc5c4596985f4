//! In-memory cache of product paging sequences, keyed by `(category, sort)`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use shopfront_core::{AppConfig, Page, Product, QueryKey};

#[derive(Debug, Clone)]
struct CachedSequence {
    pages: Vec<Page<Product>>,
    updated_at: Instant,
}

/// Shared cache handle. Clones share the same storage.
///
/// Created once at startup and passed to every [`ProductFetcher`] that
/// should share results.
///
/// [`ProductFetcher`]: crate::fetcher::ProductFetcher
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CachedSequence>>>,
    stale_after: Option<Duration>,
}

impl QueryCache {
    /// A cache whose entries never go stale.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose entries are dropped once older than `stale_after`.
    #[must_use]
    pub fn with_stale_after(stale_after: Duration) -> Self {
        Self {
            entries: Arc::default(),
            stale_after: Some(stale_after),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        match config.cache_stale_secs {
            Some(secs) => Self::with_stale_after(Duration::from_secs(secs)),
            None => Self::new(),
        }
    }

    /// Returns the cached pages for `key` if present and fresh. A stale
    /// entry is evicted and reported as a miss.
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<Vec<Page<Product>>> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if let Some(stale_after) = self.stale_after {
            if entry.updated_at.elapsed() >= stale_after {
                entries.remove(key);
                return None;
            }
        }
        Some(entry.pages.clone())
    }

    /// Replaces the sequence stored for `key`.
    pub fn store(&self, key: QueryKey, pages: Vec<Page<Product>>) {
        self.lock().insert(
            key,
            CachedSequence {
                pages,
                updated_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CachedSequence>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
