//! Per-depth transposition of logs
//!
//! Logs are aligned by message position: everything at position `i` in any
//! log lands in depth group `i`. Shorter logs simply stop contributing.

use braid_model::{LogId, MessageRecord};
use std::collections::BTreeMap;

/// One message tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DepthEntry {
    /// Originating log
    pub log: LogId,
    /// Position within that log
    pub position: usize,
    /// Working copy of the record
    pub record: MessageRecord,
}

/// All messages found at one position across logs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthGroup {
    /// Entries in log-name order
    pub entries: Vec<DepthEntry>,
}

impl DepthGroup {
    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty group
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Transpose logs into depth-ordered groups
///
/// Records are cloned so later stages can normalize their copies without
/// touching the caller's input.
#[must_use]
pub fn transpose(logs: &BTreeMap<LogId, Vec<MessageRecord>>) -> Vec<DepthGroup> {
    let max_len = logs.values().map(Vec::len).max().unwrap_or(0);
    let mut groups = vec![DepthGroup::default(); max_len];

    for (log, records) in logs {
        for (position, record) in records.iter().enumerate() {
            groups[position].entries.push(DepthEntry {
                log: log.clone(),
                position,
                record: record.clone(),
            });
        }
    }

    groups
}
