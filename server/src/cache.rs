//! Per-genre cache of filtered recommendation lists.
//!
//! Entries are never mutated after insertion; a refetch replaces the whole
//! entry. Reads check freshness lazily and a background task sweeps expired
//! entries on a fixed interval.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::catalog::types::Anime;
use crate::catalog::GenreKey;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub results: Arc<[Anime]>,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> ChronoDuration {
        now - self.cached_at
    }
}

pub struct RecommendationCache {
    entries: RwLock<HashMap<GenreKey, CacheEntry>>,
    ttl: Duration,
}

impl RecommendationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // An entry stamped in the future (clock skew) counts as fresh.
    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age(now).to_std().map_or(true, |age| age < self.ttl)
    }

    pub fn get(&self, key: GenreKey) -> Option<CacheEntry> {
        self.get_at(key, Utc::now())
    }

    /// Returns the entry only while `now - cached_at < ttl`.
    pub fn get_at(&self, key: GenreKey, now: DateTime<Utc>) -> Option<CacheEntry> {
        let entries = self.read();
        entries
            .get(&key)
            .filter(|entry| self.is_fresh(entry, now))
            .cloned()
    }

    pub fn put(&self, key: GenreKey, results: impl Into<Arc<[Anime]>>) -> CacheEntry {
        self.put_at(key, results, Utc::now())
    }

    pub fn put_at(
        &self,
        key: GenreKey,
        results: impl Into<Arc<[Anime]>>,
        now: DateTime<Utc>,
    ) -> CacheEntry {
        let entry = CacheEntry {
            results: results.into(),
            cached_at: now,
        };
        self.write().insert(key, entry.clone());
        entry
    }

    /// Drops every entry whose age has reached the TTL. Returns how many went.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn keys(&self) -> Vec<GenreKey> {
        let mut keys: Vec<GenreKey> = self.read().keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<GenreKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<GenreKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Sweeps once immediately, then every `period`.
pub fn spawn_sweeper(cache: Arc<RecommendationCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            let evicted = cache.sweep(Utc::now());
            if evicted > 0 {
                tracing::info!("Evicted {} expired recommendation entries", evicted);
            } else {
                tracing::debug!("Cache sweep found nothing to evict");
            }
        }
    })
}
