//! Variant sets and the built timeline
//!
//! Variants never enter the primary node and edge arenas. They are kept per
//! parent and fetched on demand, so the initial payload stays small.

use crate::types::{GraphEdge, GraphNode, NodeId};
use serde::Serialize;
use std::collections::btree_map::{BTreeMap, Entry};

/// One unchosen alternate and the edge reaching it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantEntry {
    /// Variant node
    pub node: GraphNode,
    /// Edge from the parent, always flagged as a swipe
    pub edge: GraphEdge,
}

/// Alternates reachable from one parent node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSet {
    /// Unchosen alternates in discovery order
    pub swipes: Vec<VariantEntry>,
    /// Pool sizes summed over every child with alternates
    pub total_swipes: usize,
    /// Selected index of the most recent child, -1 when its text was not in the pool
    pub current_swipe_index: i64,
}

impl VariantSet {
    /// Set for a node without alternates
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            swipes: Vec::new(),
            total_swipes: 0,
            current_swipe_index: -1,
        }
    }

    /// Check for a set without alternates
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.swipes.is_empty()
    }
}

impl Default for VariantSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Variant sets keyed by parent node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariantStore(BTreeMap<NodeId, VariantSet>);

impl VariantStore {
    /// Variant set of a node; empty for unknown nodes
    #[must_use]
    pub fn get(&self, node: NodeId) -> VariantSet {
        self.0.get(&node).cloned().unwrap_or_default()
    }

    /// Borrow the set of a node if it has one
    #[must_use]
    pub fn find(&self, node: NodeId) -> Option<&VariantSet> {
        self.0.get(&node)
    }

    pub(crate) fn entry(&mut self, node: NodeId) -> Entry<'_, NodeId, VariantSet> {
        self.0.entry(node)
    }

    /// Number of parents with alternates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for no alternates at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate parents and their sets
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &VariantSet)> {
        self.0.iter().map(|(id, set)| (*id, set))
    }
}

/// Primary graph: root plus every selected message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineGraph {
    /// Nodes in id order, root first
    pub nodes: Vec<GraphNode>,
    /// Edges in id order
    pub edges: Vec<GraphEdge>,
}

impl TimelineGraph {
    /// The root node
    #[must_use]
    pub fn root(&self) -> Option<&GraphNode> {
        self.nodes.first().filter(|n| n.is_root())
    }

    /// Look up a node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|index| &self.nodes[index])
    }

    /// Edges ending at a node
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Edges leaving a node
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Checkpoint nodes in id order
    pub fn checkpoints(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.is_checkpoint)
    }
}

/// A finished build: primary graph plus the variant store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    /// Nodes and edges returned to clients
    pub graph: TimelineGraph,
    /// Alternates fetched separately per node
    #[serde(skip)]
    pub variants: VariantStore,
}

impl Timeline {
    /// Alternates of a node; empty for unknown nodes
    #[must_use]
    pub fn variants_of(&self, node: NodeId) -> VariantSet {
        self.variants.get(node)
    }
}
