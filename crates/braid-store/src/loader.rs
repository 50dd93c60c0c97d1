//! Concurrent log loading
//!
//! Every log of a subject is read at once and collected as reads finish.
//! A read that fails or runs past the timeout is logged and left out, so one
//! bad log never blocks or fails the others.

use crate::error::StoreError;
use crate::store::LogStore;
use braid_model::{LogId, MessageRecord, Subject};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Logs read for one subject
#[derive(Debug, Default)]
pub struct LoadedLogs {
    /// Successfully read logs
    pub logs: BTreeMap<LogId, Vec<MessageRecord>>,
    /// Logs that failed or timed out, with the reason
    pub skipped: Vec<(LogId, StoreError)>,
}

impl LoadedLogs {
    /// Check whether every listed log was read
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Read every log of a subject concurrently
///
/// # Errors
/// Returns error only if the subject's logs cannot be listed
pub async fn load_logs<S>(store: &S, subject: &Subject, timeout: Duration) -> Result<LoadedLogs, StoreError>
where
    S: LogStore + ?Sized,
{
    let started = Instant::now();
    let ids = store.list_logs(subject).await?;
    let listed = ids.len();

    let mut pending: FuturesUnordered<_> = ids
        .into_iter()
        .map(|log| async move {
            let result = match tokio::time::timeout(timeout, store.read_log(subject, &log)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(log.clone())),
            };
            (log, result)
        })
        .collect();

    let mut loaded = LoadedLogs::default();
    while let Some((log, result)) = pending.next().await {
        match result {
            Ok(records) => {
                loaded.logs.insert(log, records);
            }
            Err(e) => {
                tracing::warn!(subject = %subject, log = %log, error = %e, "skipping unreadable log");
                loaded.skipped.push((log, e));
            }
        }
    }
    loaded.skipped.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(
        subject = %subject,
        listed,
        loaded = loaded.logs.len(),
        skipped = loaded.skipped.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "loaded logs"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLogStore;
    use crate::store::MockLogStore;
    use braid_test_utils::{log_id, text_messages};

    fn subject() -> Subject {
        Subject::character("Bot").unwrap()
    }

    #[tokio::test]
    async fn failed_read_is_omitted() {
        let mut store = MockLogStore::new();
        store
            .expect_list_logs()
            .returning(|_| Ok(vec![log_id("good"), log_id("bad")]));
        store.expect_read_log().returning(|_, log| {
            if log.as_str() == "bad" {
                Err(StoreError::Unavailable("disk on fire".into()))
            } else {
                Ok(text_messages(&["hi"]))
            }
        });

        let loaded = load_logs(&store, &subject(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(loaded.logs.keys().collect::<Vec<_>>(), vec![&log_id("good")]);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].0, log_id("bad"));
        assert!(!loaded.is_complete());
    }

    #[tokio::test]
    async fn listing_failure_is_an_error() {
        let mut store = MockLogStore::new();
        store
            .expect_list_logs()
            .returning(|s| Err(StoreError::SubjectNotFound(s.clone())));
        store.expect_read_log().never();

        let result = load_logs(&store, &subject(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(StoreError::SubjectNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_read_times_out_without_blocking_others() {
        let store = MemoryLogStore::new();
        store.insert_log(&subject(), log_id("fast"), text_messages(&["a"])).await;
        store.insert_log(&subject(), log_id("slow"), text_messages(&["b"])).await;
        store.stall_log(&subject(), log_id("slow"), Duration::from_secs(60)).await;

        let loaded = load_logs(&store, &subject(), Duration::from_secs(5)).await.unwrap();
        assert!(loaded.logs.contains_key("fast"));
        assert!(!loaded.logs.contains_key("slow"));
        assert!(matches!(loaded.skipped[0].1, StoreError::Timeout(_)));
    }

    #[tokio::test]
    async fn empty_subject_loads_nothing() {
        let mut store = MockLogStore::new();
        store.expect_list_logs().returning(|_| Ok(Vec::new()));

        let loaded = load_logs(&store, &subject(), Duration::from_secs(1)).await.unwrap();
        assert!(loaded.logs.is_empty());
        assert!(loaded.is_complete());
    }
}
