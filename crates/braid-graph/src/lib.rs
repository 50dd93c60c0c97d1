//! Braid Graph Engine
//!
//! Merges many linear conversation logs that share prefixes into one rooted
//! DAG: messages with the same text at the same depth become one node, logs
//! diverge where their texts differ, and checkpoints into other logs get
//! colored paths back to the root.
//!
//! # Pipeline
//!
//! ```text
//! logs ─► transpose ─► group_by_content ─► synthesize_node ─► assemble ─► highlight
//!          (depths)      (per depth)         (per partition)     (edges,    (checkpoint
//!                                                                 variants)   paths)
//! ```
//!
//! The engine is pure and synchronous. It never fails: unusable messages and
//! dead checkpoint links are logged and dropped, and the result is always a
//! valid graph with exactly one root.
//!
//! # Example
//!
//! ```rust
//! use braid_graph::build_graph;
//! use braid_model::{LogId, MessageRecord};
//! use std::collections::BTreeMap;
//!
//! let mut logs = BTreeMap::new();
//! logs.insert(LogId::new("a").unwrap(), vec![MessageRecord::new("Bot", "hi")]);
//! logs.insert(LogId::new("b").unwrap(), vec![MessageRecord::new("Bot", "hi")]);
//!
//! let timeline = build_graph(&logs);
//! assert_eq!(timeline.graph.nodes.len(), 2);
//! ```

#![warn(unreachable_pub)]

pub mod assemble;
pub mod color;
pub mod grouping;
pub mod highlight;
pub mod node;
pub mod preprocess;
pub mod types;
pub mod variants;

pub use assemble::{assemble, AssembledGraph, GraphAssembler};
pub use color::{color_for, Rgb};
pub use highlight::{highlight_checkpoint_paths, HighlightStyle};
pub use types::{EdgeHighlight, EdgeId, GraphEdge, GraphNode, MessageLocation, NodeId, NodeKind};
pub use variants::{Timeline, TimelineGraph, VariantEntry, VariantSet, VariantStore};

use braid_model::{LogId, MessageRecord};
use std::collections::BTreeMap;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the timeline for a set of logs with the default highlight style
#[must_use]
pub fn build_graph(logs: &BTreeMap<LogId, Vec<MessageRecord>>) -> Timeline {
    build_graph_with(logs, &HighlightStyle::default())
}

/// Build the timeline for a set of logs
#[must_use]
pub fn build_graph_with(logs: &BTreeMap<LogId, Vec<MessageRecord>>, style: &HighlightStyle) -> Timeline {
    let AssembledGraph {
        mut nodes,
        mut edges,
        variants,
    } = assemble(logs);
    let highlighted = highlight_checkpoint_paths(&mut nodes, &mut edges, style);

    tracing::debug!(
        logs = logs.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        checkpoints = nodes.iter().filter(|n| n.is_checkpoint).count(),
        highlighted,
        variant_parents = variants.len(),
        "built timeline graph"
    );

    Timeline {
        graph: TimelineGraph { nodes, edges },
        variants,
    }
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building timelines
    pub use crate::{build_graph, GraphEdge, GraphNode, NodeId, Timeline, TimelineGraph, VariantSet};
    pub use braid_model::{LogId, MessageRecord};
}
