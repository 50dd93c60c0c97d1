//! Timeline service
//!
//! The boundary between transport and engine: validates requests, answers
//! from the cache when it can, otherwise loads every log of the subject,
//! builds the graph and caches the result.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use braid_cache::{CacheKey, TimelineCache};
use braid_graph::{build_graph_with, HighlightStyle, NodeId, Timeline, VariantSet};
use braid_model::Subject;
use braid_store::{load_logs, FileLogStore, LogStore};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request for a subject's timeline graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    /// Character or group id
    #[serde(default)]
    pub subject: Option<String>,
    /// Whether `subject` names a group
    #[serde(default)]
    pub is_group: bool,
}

impl TimelineRequest {
    /// Request for a character
    #[must_use]
    pub fn character(id: impl Into<String>) -> Self {
        Self {
            subject: Some(id.into()),
            is_group: false,
        }
    }

    /// Request for a group
    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            subject: Some(id.into()),
            is_group: true,
        }
    }
}

/// Request for the alternates of one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsRequest {
    /// Parent node id
    pub node_id: u32,
    /// Character or group id
    #[serde(default)]
    pub subject: Option<String>,
    /// Whether `subject` names a group
    #[serde(default)]
    pub is_group: bool,
}

/// Cache-or-build timeline service
pub struct TimelineService {
    store: Arc<dyn LogStore>,
    cache: TimelineCache,
    fetch_timeout: Duration,
    style: HighlightStyle,
}

impl std::fmt::Debug for TimelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineService")
            .field("cache", &self.cache)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl TimelineService {
    /// Create service over a store and cache
    pub fn new(store: Arc<dyn LogStore>, cache: TimelineCache) -> Self {
        Self {
            store,
            cache,
            fetch_timeout: ServiceConfig::default().fetch_timeout(),
            style: HighlightStyle::default(),
        }
    }

    /// Create file-backed service from configuration
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = Arc::new(FileLogStore::new(&config.data_root));
        let cache = TimelineCache::with_ttl(config.cache_capacity, config.cache_ttl());
        Self::new(store, cache).with_fetch_timeout(config.fetch_timeout())
    }

    /// With per-log fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// With highlight style
    #[inline]
    #[must_use]
    pub fn with_highlight_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    /// The result cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &TimelineCache {
        &self.cache
    }

    /// Timeline of a subject, from cache or freshly built
    ///
    /// # Errors
    /// - `MissingSubject` / `InvalidSubject` for a bad request
    /// - `Store` if the subject's logs cannot be listed
    pub async fn timeline(&self, request: &TimelineRequest) -> Result<Arc<Timeline>, ServiceError> {
        let subject = resolve_subject(request.subject.as_deref(), request.is_group)?;
        let key = CacheKey::from(&subject);

        self.cache
            .try_get_or_insert_with(key, || self.build(&subject))
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(ServiceError::Shared))
    }

    /// Alternates of a node in a cached timeline
    ///
    /// Unknown nodes answer an empty set.
    ///
    /// # Errors
    /// - `MissingSubject` / `InvalidSubject` for a bad request
    /// - `NotBuilt` if the timeline is not cached
    pub async fn variants(&self, request: &VariantsRequest) -> Result<VariantSet, ServiceError> {
        let subject = resolve_subject(request.subject.as_deref(), request.is_group)?;
        let key = CacheKey::from(&subject);

        let timeline = self.cache.get(&key).await.ok_or_else(|| ServiceError::NotBuilt {
            subject: subject.to_string(),
        })?;
        Ok(timeline.variants_of(NodeId(request.node_id)))
    }

    /// Drop cached timelines; `None` or an empty subject drops all of them
    pub async fn invalidate(&self, subject: Option<&str>) {
        match subject.map(str::trim).filter(|s| !s.is_empty()) {
            Some(subject) => self.cache.invalidate_subject(subject).await,
            None => self.cache.clear(),
        }
    }

    async fn build(&self, subject: &Subject) -> Result<Timeline, ServiceError> {
        let started = Instant::now();
        let loaded = load_logs(self.store.as_ref(), subject, self.fetch_timeout).await?;
        let timeline = build_graph_with(&loaded.logs, &self.style);

        tracing::info!(
            subject = %subject,
            logs = loaded.logs.len(),
            skipped = loaded.skipped.len(),
            nodes = timeline.graph.nodes.len(),
            edges = timeline.graph.edges.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "built timeline"
        );
        Ok(timeline)
    }
}

fn resolve_subject(subject: Option<&str>, is_group: bool) -> Result<Subject, ServiceError> {
    let id = subject
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ServiceError::MissingSubject)?;
    Ok(Subject::new(id, is_group)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_subject_is_missing() {
        assert!(matches!(resolve_subject(None, false), Err(ServiceError::MissingSubject)));
        assert!(matches!(resolve_subject(Some("  "), true), Err(ServiceError::MissingSubject)));
    }

    #[test]
    fn path_like_subject_is_invalid() {
        assert!(matches!(
            resolve_subject(Some("../etc"), false),
            Err(ServiceError::InvalidSubject(_))
        ));
    }

    #[test]
    fn requests_deserialize_camel_case() {
        let request: VariantsRequest =
            serde_json::from_str(r#"{"nodeId":4,"subject":"g","isGroup":true}"#).unwrap();
        assert_eq!(request.node_id, 4);
        assert!(request.is_group);

        let request: TimelineRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.subject, None);
        assert!(!request.is_group);
    }
}
