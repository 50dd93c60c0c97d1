//! File-backed log store
//!
//! Layout under the data root:
//!
//! ```text
//! chats/<character>/<log>.jsonl     character logs
//! groups/<group>.json               group index: { "chats": ["<log>", ...] }
//! group chats/<log>.jsonl           group logs
//! ```

use crate::error::StoreError;
use crate::store::LogStore;
use braid_model::{parse_jsonl, LogId, MessageRecord, Subject};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const LOG_EXTENSION: &str = "jsonl";

/// Group index file contents
#[derive(Debug, Default, Deserialize)]
struct GroupIndex {
    #[serde(default)]
    chats: Vec<String>,
}

/// Log store over a data directory
#[derive(Debug, Clone)]
pub struct FileLogStore {
    root: PathBuf,
}

impl FileLogStore {
    /// Create store rooted at a data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a subject's log files
    #[must_use]
    pub fn log_dir(&self, subject: &Subject) -> PathBuf {
        if subject.is_group {
            self.root.join("group chats")
        } else {
            self.root.join("chats").join(&subject.id)
        }
    }

    /// Path of one log file
    #[must_use]
    pub fn log_path(&self, subject: &Subject, log: &LogId) -> PathBuf {
        self.log_dir(subject).join(format!("{log}.{LOG_EXTENSION}"))
    }

    /// Path of a group index
    #[must_use]
    pub fn group_index_path(&self, group_id: &str) -> PathBuf {
        self.root.join("groups").join(format!("{group_id}.json"))
    }

    async fn list_character_logs(&self, subject: &Subject) -> Result<Vec<LogId>, StoreError> {
        let dir = self.log_dir(subject);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::SubjectNotFound(subject.clone()));
            }
            Err(e) => return Err(StoreError::io_error(&dir, e)),
        };

        let mut logs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::io_error(&dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping log with non UTF-8 name");
                continue;
            };
            match LogId::new(stem) {
                Ok(log) => logs.push(log),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping log with invalid name"),
            }
        }
        Ok(logs)
    }

    async fn list_group_logs(&self, subject: &Subject) -> Result<Vec<LogId>, StoreError> {
        let path = self.group_index_path(&subject.id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::SubjectNotFound(subject.clone()));
            }
            Err(e) => return Err(StoreError::io_error(&path, e)),
        };
        let index: GroupIndex =
            serde_json::from_str(&raw).map_err(|source| StoreError::InvalidIndex { path: path.clone(), source })?;

        let logs = index
            .chats
            .into_iter()
            .filter_map(|name| match LogId::new(name.as_str()) {
                Ok(log) => Some(log),
                Err(e) => {
                    tracing::warn!(group = %subject.id, name = %name, error = %e, "skipping invalid group log id");
                    None
                }
            })
            .collect();
        Ok(logs)
    }
}

#[async_trait::async_trait]
impl LogStore for FileLogStore {
    async fn list_logs(&self, subject: &Subject) -> Result<Vec<LogId>, StoreError> {
        let mut logs = if subject.is_group {
            self.list_group_logs(subject).await?
        } else {
            self.list_character_logs(subject).await?
        };
        logs.sort();
        logs.dedup();
        Ok(logs)
    }

    async fn read_log(&self, subject: &Subject, log: &LogId) -> Result<Vec<MessageRecord>, StoreError> {
        let path = self.log_path(subject, log);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::LogNotFound {
                    subject: subject.clone(),
                    log: log.clone(),
                });
            }
            Err(e) => return Err(StoreError::io_error(&path, e)),
        };
        parse_jsonl(&raw).map_err(|source| StoreError::Parse {
            log: log.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_test_utils::log_id;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn lists_character_logs_sorted() {
        let dir = TempDir::new().unwrap();
        let chats = dir.path().join("chats").join("Bot");
        write(&chats.join("b.jsonl"), "");
        write(&chats.join("a.jsonl"), "");
        write(&chats.join("notes.txt"), "");

        let store = FileLogStore::new(dir.path());
        let logs = store.list_logs(&Subject::character("Bot").unwrap()).await.unwrap();
        assert_eq!(logs, vec![log_id("a"), log_id("b")]);
    }

    #[tokio::test]
    async fn lists_group_logs_from_index() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("groups").join("party.json"),
            r#"{"name":"Party","chats":["second","first","../escape"]}"#,
        );

        let store = FileLogStore::new(dir.path());
        let logs = store.list_logs(&Subject::group("party").unwrap()).await.unwrap();
        assert_eq!(logs, vec![log_id("first"), log_id("second")]);
    }

    #[tokio::test]
    async fn reads_group_log_from_shared_dir() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("group chats").join("first.jsonl"),
            "{\"name\":\"A\",\"mes\":\"hello\"}\n",
        );

        let store = FileLogStore::new(dir.path());
        let records = store
            .read_log(&Subject::group("party").unwrap(), &log_id("first"))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text.as_str(), Some("hello"));
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FileLogStore::new(dir.path());

        let err = store.list_logs(&Subject::character("Nobody").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::SubjectNotFound(_)));
        let err = store.list_logs(&Subject::group("none").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::SubjectNotFound(_)));
    }

    #[tokio::test]
    async fn broken_line_fails_the_whole_log() {
        let dir = TempDir::new().unwrap();
        let subject = Subject::character("Bot").unwrap();
        let store = FileLogStore::new(dir.path());
        write(&store.log_path(&subject, &log_id("bad")), "{\"mes\":\"ok\"}\nnot json\n");

        let err = store.read_log(&subject, &log_id("bad")).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn malformed_group_index_is_reported() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("groups").join("g.json"), "{ nope");
        let store = FileLogStore::new(dir.path());
        let err = store.list_logs(&Subject::group("g").unwrap()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidIndex { .. }));
    }
}
