//! Memoized decoded overlays.
//!
//! The key space is bounded (10 variables × 12 steps = 120 entries), so the
//! cache carries no eviction policy: a session holds at most one decoded
//! overlay per key. If either bound ever becomes dynamic, an eviction
//! policy becomes necessary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::OverlayError;
use super::key::OverlayKey;
use super::source::OverlaySource;
use crate::raster::DecodedOverlay;
use crate::timestep::TimeStep;
use crate::variable::VariableId;

type InflightFetch = Shared<BoxFuture<'static, Result<Arc<DecodedOverlay>, OverlayError>>>;

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Get-or-populate cache of decoded overlays.
///
/// At most one fetch+decode is in flight per key: concurrent requests for
/// an uncached key share one pending computation and all receive the same
/// result, failures included. Failures are never cached; the next request
/// for the key retries.
pub struct LayerCache<S> {
    source: Arc<S>,
    entries: Arc<DashMap<OverlayKey, Arc<DecodedOverlay>>>,
    inflight: DashMap<OverlayKey, InflightFetch>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: OverlaySource + 'static> LayerCache<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            entries: Arc::new(DashMap::new()),
            inflight: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached overlay for `key`, computing and storing it on a
    /// miss.
    pub async fn get_or_compute(&self, key: OverlayKey) -> Result<Arc<DecodedOverlay>, OverlayError> {
        if let Some(entry) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(&entry));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let fetch = match self.inflight.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(occupied) => occupied.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let source = Arc::clone(&self.source);
                let entries = Arc::clone(&self.entries);
                let fetch = async move {
                    // A finished computation may have landed between the
                    // miss above and this future being registered.
                    if let Some(entry) = entries.get(&key) {
                        return Ok(Arc::clone(&entry));
                    }
                    source.fetch_and_decode(key).await.map(Arc::new)
                }
                .boxed()
                .shared();
                vacant.insert(fetch.clone());
                fetch
            }
        };

        let result = fetch.clone().await;

        // Only waiters of this computation may clear the slot; a newer one
        // may already occupy it.
        self.inflight.remove_if(&key, |_, pending| pending.ptr_eq(&fetch));

        if let Ok(overlay) = &result {
            self.entries.insert(key, Arc::clone(overlay));
        }
        result
    }

    /// Whether a decoded overlay is cached for `key`.
    pub fn contains(&self, key: OverlayKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of cached steps for a variable.
    pub fn cached_steps(&self, variable: VariableId) -> usize {
        TimeStep::all()
            .filter(|step| self.contains(OverlayKey::new(variable, *step)))
            .count()
    }

    /// Whether every step of a variable is cached.
    pub fn is_variable_complete(&self, variable: VariableId) -> bool {
        TimeStep::all().all(|step| self.contains(OverlayKey::new(variable, step)))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
