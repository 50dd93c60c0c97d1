//! Testing utilities for Braid workspace
//!
//! Shared log fixtures and builders.

#![allow(missing_docs)]

use braid_model::{LogId, MessageRecord};
use std::collections::BTreeMap;

pub type LogSet = BTreeMap<LogId, Vec<MessageRecord>>;

pub fn log_id(name: &str) -> LogId {
    LogId::new(name).unwrap()
}

/// Plain text message; even positions are user turns, odd ones the bot's
pub fn text_message(position: usize, text: &str) -> MessageRecord {
    if position % 2 == 0 {
        MessageRecord::new("User", text).from_user()
    } else {
        MessageRecord::new("Bot", text)
    }
}

pub fn text_messages(texts: &[&str]) -> Vec<MessageRecord> {
    texts
        .iter()
        .enumerate()
        .map(|(position, text)| text_message(position, text))
        .collect()
}

/// Header line as written by the host application: metadata, no body
pub fn header_record() -> MessageRecord {
    MessageRecord::default()
}

#[derive(Debug, Default)]
pub struct LogSetBuilder {
    logs: LogSet,
}

impl LogSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(mut self, name: &str, records: Vec<MessageRecord>) -> Self {
        self.logs.insert(log_id(name), records);
        self
    }

    pub fn text_log(self, name: &str, texts: &[&str]) -> Self {
        self.log(name, text_messages(texts))
    }

    pub fn build(self) -> LogSet {
        self.logs
    }
}
