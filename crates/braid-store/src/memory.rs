//! In-memory log store
//!
//! Useful for embedding and tests. Individual logs can be made to fail or
//! to stall so callers can exercise partial-failure handling.

use crate::error::StoreError;
use crate::store::LogStore;
use braid_model::{LogId, MessageRecord, Subject};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::RwLock;

/// Injected behavior for one log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Fail,
    Stall(Duration),
}

#[derive(Debug, Default)]
struct Inner {
    logs: HashMap<Subject, BTreeMap<LogId, Vec<MessageRecord>>>,
    faults: HashMap<(Subject, LogId), Fault>,
}

/// Log store held in memory
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    inner: RwLock<Inner>,
}

impl MemoryLogStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a log
    pub async fn insert_log(&self, subject: &Subject, log: LogId, records: Vec<MessageRecord>) {
        let mut inner = self.inner.write().await;
        inner.logs.entry(subject.clone()).or_default().insert(log, records);
    }

    /// Add every log of a set
    pub async fn insert_logs(&self, subject: &Subject, logs: BTreeMap<LogId, Vec<MessageRecord>>) {
        let mut inner = self.inner.write().await;
        inner.logs.entry(subject.clone()).or_default().extend(logs);
    }

    /// Remove a log; returns whether it existed
    pub async fn remove_log(&self, subject: &Subject, log: &LogId) -> bool {
        let mut inner = self.inner.write().await;
        inner
            .logs
            .get_mut(subject)
            .is_some_and(|logs| logs.remove(log).is_some())
    }

    /// Make reads of a log fail
    pub async fn fail_log(&self, subject: &Subject, log: LogId) {
        self.inner
            .write()
            .await
            .faults
            .insert((subject.clone(), log), Fault::Fail);
    }

    /// Make reads of a log wait before answering
    pub async fn stall_log(&self, subject: &Subject, log: LogId, delay: Duration) {
        self.inner
            .write()
            .await
            .faults
            .insert((subject.clone(), log), Fault::Stall(delay));
    }

    /// Drop every injected fault
    pub async fn clear_faults(&self) {
        self.inner.write().await.faults.clear();
    }
}

#[async_trait::async_trait]
impl LogStore for MemoryLogStore {
    async fn list_logs(&self, subject: &Subject) -> Result<Vec<LogId>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .logs
            .get(subject)
            .map(|logs| logs.keys().cloned().collect())
            .ok_or_else(|| StoreError::SubjectNotFound(subject.clone()))
    }

    async fn read_log(&self, subject: &Subject, log: &LogId) -> Result<Vec<MessageRecord>, StoreError> {
        let fault = {
            let inner = self.inner.read().await;
            inner.faults.get(&(subject.clone(), log.clone())).copied()
        };
        match fault {
            Some(Fault::Fail) => {
                return Err(StoreError::Unavailable(format!("injected failure for {log}")));
            }
            Some(Fault::Stall(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }

        let inner = self.inner.read().await;
        inner
            .logs
            .get(subject)
            .and_then(|logs| logs.get(log))
            .cloned()
            .ok_or_else(|| StoreError::LogNotFound {
                subject: subject.clone(),
                log: log.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_test_utils::{log_id, text_messages};

    #[tokio::test]
    async fn round_trips_logs() {
        let store = MemoryLogStore::new();
        let subject = Subject::character("Bot").unwrap();
        store.insert_log(&subject, log_id("b"), text_messages(&["x"])).await;
        store.insert_log(&subject, log_id("a"), text_messages(&["y", "z"])).await;

        assert_eq!(store.list_logs(&subject).await.unwrap(), vec![log_id("a"), log_id("b")]);
        assert_eq!(store.read_log(&subject, &log_id("a")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_affects_only_that_log() {
        let store = MemoryLogStore::new();
        let subject = Subject::character("Bot").unwrap();
        store.insert_log(&subject, log_id("ok"), text_messages(&["x"])).await;
        store.insert_log(&subject, log_id("bad"), text_messages(&["x"])).await;
        store.fail_log(&subject, log_id("bad")).await;

        assert!(store.read_log(&subject, &log_id("ok")).await.is_ok());
        let err = store.read_log(&subject, &log_id("bad")).await.unwrap_err();
        assert!(err.is_transient());

        store.clear_faults().await;
        assert!(store.read_log(&subject, &log_id("bad")).await.is_ok());
    }

    #[tokio::test]
    async fn removed_log_is_not_found() {
        let store = MemoryLogStore::new();
        let subject = Subject::group("g").unwrap();
        store.insert_log(&subject, log_id("a"), Vec::new()).await;

        assert!(store.remove_log(&subject, &log_id("a")).await);
        assert!(!store.remove_log(&subject, &log_id("a")).await);
        assert!(matches!(
            store.read_log(&subject, &log_id("a")).await,
            Err(StoreError::LogNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let store = MemoryLogStore::new();
        let err = store.list_logs(&Subject::character("x").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::SubjectNotFound(_)));
    }
}
