//! Braid Log Store
//!
//! Where conversation logs come from, and how they are gathered for one
//! timeline build.
//!
//! # Core Concepts
//!
//! - [`LogStore`]: async source of logs, per subject
//! - [`FileLogStore`]: JSONL files under a data directory
//! - [`MemoryLogStore`]: in-memory store with injectable faults
//! - [`load_logs`]: concurrent, failure-tolerant loading of all logs
//!
//! # Example
//!
//! ```rust,ignore
//! use braid_store::{load_logs, FileLogStore};
//! use braid_model::Subject;
//! use std::time::Duration;
//!
//! let store = FileLogStore::new("data/default-user");
//! let subject = Subject::character("Seraphina")?;
//! let loaded = load_logs(&store, &subject, Duration::from_secs(5)).await?;
//! println!("{} logs, {} skipped", loaded.logs.len(), loaded.skipped.len());
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod file;
pub mod loader;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use file::FileLogStore;
pub use loader::{load_logs, LoadedLogs};
pub use memory::MemoryLogStore;
pub use store::LogStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
