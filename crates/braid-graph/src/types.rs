//! Graph records
//!
//! Nodes and edges live in flat arenas and reference each other by integer
//! id, so a built graph is plain data: cheap to clone, trivially serialized.

use crate::color::Rgb;
use braid_model::{Author, LogId, Timestamp};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Node identifier, sequential within one build; the root is always 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The synthetic conversation root
    pub const ROOT: Self = Self(0);

    /// Check for the root id
    #[inline]
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge identifier, sequential within one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Synthetic root every log starts from
    Root,
    /// A message selected in at least one log
    Message,
    /// An alternate body nobody selected
    Variant,
}

/// Where a log passes through a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageLocation {
    /// Node depth (message index + 1)
    pub depth: u32,
    /// Position of the message in its log
    pub message_index: usize,
    /// Total records in that log
    pub log_length: usize,
}

/// A conversation graph node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Node id
    pub id: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Depth; 0 for the root
    pub depth: u32,
    /// Normalized message text
    pub text: String,
    /// Author display name
    pub name: String,
    /// Author classification
    pub author: Author,
    /// Send time of the first member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_date: Option<Timestamp>,
    /// Marks a checkpoint into another log
    pub is_checkpoint: bool,
    /// Checkpoint target log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_target: Option<LogId>,
    /// Checkpoint color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    /// Border color set while highlighting checkpoint paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgb>,
    /// Size of this node's alternate pool
    pub total_swipes: usize,
    /// Index of this node's text in its alternate pool, -1 if absent
    pub current_swipe_index: i64,
    /// Position of a variant in its source alternate list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_index: Option<usize>,
    /// Every log passing through this node
    pub sessions: BTreeMap<LogId, MessageLocation>,
}

impl GraphNode {
    /// The synthetic root node
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            kind: NodeKind::Root,
            depth: 0,
            text: String::new(),
            name: "Start".to_string(),
            author: Author::System,
            send_date: None,
            is_checkpoint: false,
            checkpoint_target: None,
            color: None,
            border_color: None,
            total_swipes: 0,
            current_swipe_index: -1,
            swipe_index: None,
            sessions: BTreeMap::new(),
        }
    }

    /// Check whether this node is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }
}

/// Decoration applied to an edge on a checkpoint path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeHighlight {
    /// Color of the checkpoint that claimed this edge
    pub color: Rgb,
    /// Target log of that checkpoint
    pub checkpoint: Option<LogId>,
    /// Stroke width
    pub thickness: f32,
    /// Draw order
    pub z_index: i32,
}

/// A directed edge between nodes of increasing depth
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Edge id
    pub id: EdgeId,
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Points at a variant node
    pub is_swipe: bool,
    /// Position of the variant in its source alternate list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_index: Option<usize>,
    /// Logs traversing this edge
    ///
    /// Logs that reach the target from the same parent share one edge, so a
    /// target has one incoming edge per distinct parent and each log passing
    /// through it is listed on exactly one of them. Empty for variant edges.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogId>,
    /// Checkpoint path decoration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<EdgeHighlight>,
}

impl GraphEdge {
    /// Plain edge between two nodes
    #[must_use]
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            is_swipe: false,
            swipe_index: None,
            logs: Vec::new(),
            highlight: None,
        }
    }

    /// Edge to a variant node
    #[must_use]
    pub fn variant(id: EdgeId, source: NodeId, target: NodeId, swipe_index: usize) -> Self {
        Self {
            is_swipe: true,
            swipe_index: Some(swipe_index),
            ..Self::new(id, source, target)
        }
    }
}
