//! Braid Core
//!
//! The timeline service: turns a request naming a subject into a built,
//! cached conversation graph, and answers follow-up variant lookups from the
//! same build.
//!
//! # Architecture
//!
//! ```text
//! request ─► TimelineService ─► TimelineCache ──hit──► Arc<Timeline>
//!                                   │ miss
//!                                   ▼
//!                      load_logs(LogStore) ─► build_graph ─► cache put
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use braid_core::{ServiceConfig, TimelineRequest, TimelineService};
//!
//! let service = TimelineService::from_config(&ServiceConfig::default());
//! let timeline = service.timeline(&TimelineRequest::character("Seraphina")).await?;
//! println!("{} nodes", timeline.graph.nodes.len());
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ConfigError, ServiceError};
pub use service::{TimelineRequest, TimelineService, VariantsRequest};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for serving timelines
    pub use crate::{ServiceConfig, ServiceError, TimelineRequest, TimelineService, VariantsRequest};
    pub use braid_cache::{CacheKey, TimelineCache};
    pub use braid_graph::{Timeline, VariantSet};
    pub use braid_store::{FileLogStore, LogStore, MemoryLogStore};
}
