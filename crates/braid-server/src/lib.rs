//! Braid Server
//!
//! HTTP front end of the timeline service.
//!
//! # Endpoints
//!
//! | Method | Path                   | Body                                  | Answer                |
//! |--------|------------------------|---------------------------------------|-----------------------|
//! | GET    | `/health`              |                                       | 200                   |
//! | POST   | `/timeline`            | `{ subject, isGroup }`                | `{ nodes, edges }`    |
//! | POST   | `/timeline/swipes`     | `{ nodeId, subject, isGroup }`        | variant set           |
//! | POST   | `/timeline/invalidate` | `{ subject? }`                        | 204                   |
//!
//! Errors are `{ "error": message }` with 400, 404 or 500.

#![warn(unreachable_pub)]

pub mod http;

pub use http::{router, ApiError, AppState, InvalidateRequest};

use braid_core::{ServiceConfig, TimelineService};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Router with tracing for a file-backed service
pub fn app(config: &ServiceConfig) -> axum::Router {
    let state = AppState::new(TimelineService::from_config(config));
    router(state).layer(tower_http::trace::TraceLayer::new_for_http())
}
