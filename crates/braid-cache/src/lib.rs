//! Braid Timeline Cache
//!
//! Built timelines keyed by subject, held for a bounded time. Graph and
//! variants are stored as one [`Timeline`] entry so a variant lookup always
//! answers from the same build as the graph the client is showing.
//!
//! The cache is an ordinary value: create it at startup, hand it to the
//! service, drop it on shutdown.

#![warn(unreachable_pub)]

use braid_graph::Timeline;
use braid_model::Subject;
use moka::future::Cache;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default maximum number of cached timelines
pub const DEFAULT_CAPACITY: u64 = 1_000;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cache key: subject id plus group flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey {
    /// Character or group id
    pub subject: String,
    /// Whether `subject` names a group
    pub is_group: bool,
}

impl CacheKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(subject: impl Into<String>, is_group: bool) -> Self {
        Self {
            subject: subject.into(),
            is_group,
        }
    }
}

impl From<&Subject> for CacheKey {
    fn from(subject: &Subject) -> Self {
        Self::new(subject.id.clone(), subject.is_group)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = if self.is_group { "group" } else { "character" };
        write!(f, "{kind}:{}", self.subject)
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of live entries
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Timeline cache with capacity bound and time-based expiration
#[derive(Debug, Clone)]
pub struct TimelineCache {
    inner: Cache<CacheKey, Arc<Timeline>>,
    counters: Arc<Counters>,
    // Bumped by every invalidation; builds that span a bump are not kept.
    generation: Arc<AtomicU64>,
}

impl TimelineCache {
    /// Create cache with max capacity and no expiration
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            counters: Arc::default(),
            generation: Arc::default(),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_capacity).time_to_live(ttl).build(),
            counters: Arc::default(),
            generation: Arc::default(),
        }
    }

    /// Store a timeline
    pub async fn put(&self, key: CacheKey, timeline: Arc<Timeline>) {
        self.inner.insert(key, timeline).await;
    }

    /// Cached timeline, if present and not expired
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Timeline>> {
        let found = self.inner.get(key).await;
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Cached timeline, or build, store and return one
    ///
    /// Concurrent callers for the same key share one build. A build that
    /// overlaps an invalidation is returned to its callers but not kept, so
    /// the next request sees fresh logs.
    ///
    /// # Errors
    /// Returns the builder's error, shared between every caller that waited
    /// on that build; nothing is cached in that case
    pub async fn try_get_or_insert_with<E, F, Fut>(&self, key: CacheKey, build: F) -> Result<Arc<Timeline>, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Timeline, E>>,
        E: Send + Sync + 'static,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let timeline = self
            .inner
            .try_get_with(key.clone(), async { build().await.map(Arc::new) })
            .await?;

        if self.generation.load(Ordering::Acquire) != generation {
            self.inner.invalidate(&key).await;
            tracing::debug!(%key, "dropped timeline built across an invalidation");
        }
        Ok(timeline)
    }

    /// Drop one entry
    pub async fn invalidate(&self, key: &CacheKey) {
        self.bump_generation();
        self.inner.invalidate(key).await;
    }

    /// Drop a subject's entries, character and group alike
    pub async fn invalidate_subject(&self, subject: &str) {
        self.bump_generation();
        for is_group in [false, true] {
            self.inner.invalidate(&CacheKey::new(subject, is_group)).await;
        }
        tracing::debug!(subject, "invalidated cached timelines");
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.bump_generation();
        self.inner.invalidate_all();
        tracing::debug!("cleared timeline cache");
    }

    /// Check if a key is cached, without touching hit counters
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.get(key).await.is_some()
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            entry_count: self.inner.entry_count(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for TimelineCache {
    /// Cache with default capacity and TTL
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
