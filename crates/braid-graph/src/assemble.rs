//! Graph assembly
//!
//! Walks depths in order, keeping one "current tail" per log: the last node
//! that log passed through. Every partition at a depth becomes a node with
//! one edge from each distinct tail among its members. Alternates offered at
//! a turn are attributed to the parent, since they are what the parent could
//! have led to instead.
//!
//! ```text
//!            ┌──► "bye"     (log a)
//! root ──► "hi"
//!            └──► "later"   (log b)
//! ```

use crate::grouping::group_by_content;
use crate::node::synthesize_node;
use crate::preprocess::{transpose, DepthEntry, DepthGroup};
use crate::types::{EdgeId, GraphEdge, GraphNode, NodeId, NodeKind};
use crate::variants::{VariantEntry, VariantSet, VariantStore};
use braid_model::{LogId, MessageRecord};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Nodes and edges of one build, before checkpoint highlighting
#[derive(Debug, Clone, Default)]
pub struct AssembledGraph {
    /// Root first, then message nodes in creation order
    pub nodes: Vec<GraphNode>,
    /// Parent-to-child edges in creation order
    pub edges: Vec<GraphEdge>,
    /// Unchosen alternates keyed by parent node
    pub variants: VariantStore,
}

/// One alternate body from the pool of a partition
#[derive(Debug, Clone, PartialEq, Eq)]
struct PoolEntry {
    text: String,
    raw_index: usize,
}

/// Mutable state threaded through the depth walk
#[derive(Debug)]
pub struct GraphAssembler {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    variants: VariantStore,
    tails: BTreeMap<LogId, NodeId>,
    log_lengths: BTreeMap<LogId, usize>,
    next_node: u32,
    next_edge: u32,
}

impl GraphAssembler {
    /// Create assembler for a set of logs; every tail starts at the root
    #[must_use]
    pub fn new(logs: &BTreeMap<LogId, Vec<MessageRecord>>) -> Self {
        let log_lengths = logs.iter().map(|(log, records)| (log.clone(), records.len())).collect();
        let tails = logs.keys().map(|log| (log.clone(), NodeId::ROOT)).collect();
        Self {
            nodes: vec![GraphNode::root()],
            edges: Vec::new(),
            variants: VariantStore::default(),
            tails,
            log_lengths,
            next_node: 1,
            next_edge: 0,
        }
    }

    fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    fn alloc_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    /// Current tail of a log
    #[inline]
    #[must_use]
    pub fn tail(&self, log: &LogId) -> Option<NodeId> {
        self.tails.get(log).copied()
    }

    /// Process the messages found at one log position
    pub fn process_depth(&mut self, position: usize, group: DepthGroup) {
        let depth = u32::try_from(position + 1).unwrap_or(u32::MAX);
        let extract_variants = position > 0;

        for (text, members) in group_by_content(group) {
            let id = self.alloc_node();
            let mut node = synthesize_node(id, depth, text, &members, &self.log_lengths);

            let mut parents: IndexMap<NodeId, Vec<LogId>> = IndexMap::new();
            for member in &members {
                let parent = self.tails.get(&member.log).copied().unwrap_or(NodeId::ROOT);
                parents.entry(parent).or_default().push(member.log.clone());
            }

            let pool = if extract_variants { variant_pool(&members) } else { Vec::new() };
            if !pool.is_empty() {
                node.total_swipes = pool.len();
                node.current_swipe_index = pool
                    .iter()
                    .position(|entry| entry.text == node.text)
                    .and_then(|index| i64::try_from(index).ok())
                    .unwrap_or(-1);
            }

            for (parent, logs) in parents {
                let edge_id = self.alloc_edge();
                let mut edge = GraphEdge::new(edge_id, parent, id);
                edge.logs = logs;
                self.edges.push(edge);

                if !pool.is_empty() {
                    self.attach_variants(parent, &node, &pool);
                }
            }

            for member in &members {
                self.tails.insert(member.log.clone(), id);
            }
            self.nodes.push(node);
        }
    }

    /// Record the unchosen alternates of `child` under `parent`
    fn attach_variants(&mut self, parent: NodeId, child: &GraphNode, pool: &[PoolEntry]) {
        let mut entries = Vec::new();
        for alternate in pool.iter().filter(|entry| entry.text != child.text) {
            let node_id = self.alloc_node();
            let edge_id = self.alloc_edge();
            let node = GraphNode {
                id: node_id,
                kind: NodeKind::Variant,
                text: alternate.text.clone(),
                is_checkpoint: false,
                checkpoint_target: None,
                color: None,
                border_color: None,
                total_swipes: 0,
                current_swipe_index: -1,
                swipe_index: Some(alternate.raw_index),
                sessions: BTreeMap::new(),
                ..child.clone()
            };
            let edge = GraphEdge::variant(edge_id, parent, node_id, alternate.raw_index);
            entries.push(VariantEntry { node, edge });
        }

        let set = self.variants.entry(parent).or_insert_with(VariantSet::empty);
        set.swipes.extend(entries);
        set.total_swipes += pool.len();
        set.current_swipe_index = child.current_swipe_index;
    }

    /// Finish assembly
    #[must_use]
    pub fn finish(self) -> AssembledGraph {
        AssembledGraph {
            nodes: self.nodes,
            edges: self.edges,
            variants: self.variants,
        }
    }
}

/// Deduplicated alternates of all members, in first-seen order
fn variant_pool(members: &[DepthEntry]) -> Vec<PoolEntry> {
    let mut pool: Vec<PoolEntry> = Vec::new();
    for member in members {
        for (raw_index, text) in member.record.swipes().iter().enumerate() {
            if pool.iter().all(|entry| &entry.text != text) {
                pool.push(PoolEntry {
                    text: text.clone(),
                    raw_index,
                });
            }
        }
    }
    pool
}

/// Assemble the graph for a set of logs, without highlighting
#[must_use]
pub fn assemble(logs: &BTreeMap<LogId, Vec<MessageRecord>>) -> AssembledGraph {
    let mut assembler = GraphAssembler::new(logs);
    for (position, group) in transpose(logs).into_iter().enumerate() {
        assembler.process_depth(position, group);
    }
    assembler.finish()
}
