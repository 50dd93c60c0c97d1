//! Log store trait

use crate::error::StoreError;
use braid_model::{LogId, MessageRecord, Subject};

/// Source of conversation logs
///
/// Implement this trait to serve logs from another backend. Reads of
/// different logs must be independent: one failing read never affects
/// another.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// Ids of every log owned by a subject, sorted
    async fn list_logs(&self, subject: &Subject) -> Result<Vec<LogId>, StoreError>;

    /// Records of one log, in order
    async fn read_log(&self, subject: &Subject, log: &LogId) -> Result<Vec<MessageRecord>, StoreError>;
}
