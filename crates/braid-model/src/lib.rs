//! Braid Model
//!
//! Conversation log records and identifiers shared by every Braid crate.
//!
//! # Core Concepts
//!
//! - [`LogId`]: name of one recorded conversation branch
//! - [`Subject`]: owner of a set of logs (character or group)
//! - [`MessageRecord`]: one turn, in the host application's log shape
//! - [`MessageText`]: body that may be missing or malformed
//! - [`parse_jsonl`]: JSONL log file to records
//!
//! # Example
//!
//! ```rust
//! use braid_model::{parse_jsonl, Author};
//!
//! let log = "{\"name\":\"Bot\",\"mes\":\"hello\"}\n";
//! let records = parse_jsonl(log).unwrap();
//! assert_eq!(records[0].author(), Author::Character);
//! ```

#![warn(unreachable_pub)]

mod ids;
mod message;
mod parse;

pub use ids::{IdError, LogId, Subject};
pub use message::{Author, MessageExtra, MessageRecord, MessageText, Timestamp};
pub use parse::{parse_jsonl, to_jsonl, ParseError};

/// A log's ordered records
pub type LogSequence = Vec<MessageRecord>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
