//! Checkpoint path highlighting
//!
//! Each checkpoint claims the chain of first incoming edges back toward the
//! root, stopping at the nearest ancestor checkpoint. Edges get thicker the
//! further they are from the checkpoint that claimed them.

use crate::types::{EdgeHighlight, GraphEdge, GraphNode, NodeId};
use std::collections::HashMap;

/// Stroke parameters for highlighted edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    /// Width of the edge right above the checkpoint
    pub base_thickness: f32,
    /// Added per hop toward the root
    pub thickness_step: f32,
    /// Upper bound
    pub max_thickness: f32,
    /// Draw order of highlighted edges
    pub z_index: i32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            base_thickness: 3.0,
            thickness_step: 0.5,
            max_thickness: 8.0,
            z_index: 10,
        }
    }
}

impl HighlightStyle {
    /// Thickness of the edge `hop` steps above the checkpoint
    #[must_use]
    pub fn thickness(&self, hop: usize) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let grown = self.base_thickness + hop as f32 * self.thickness_step;
        grown.min(self.max_thickness)
    }
}

/// Decorate every checkpoint's path toward the root
///
/// Returns the number of edges claimed.
pub fn highlight_checkpoint_paths(
    nodes: &mut [GraphNode],
    edges: &mut [GraphEdge],
    style: &HighlightStyle,
) -> usize {
    let position: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

    // first incoming edge per node, in edge order
    let mut first_incoming: HashMap<NodeId, usize> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        first_incoming.entry(edge.target).or_insert(index);
    }

    let checkpoints: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_checkpoint)
        .map(|(i, _)| i)
        .collect();

    let mut claimed = 0;
    for start in checkpoints {
        let Some(color) = nodes[start].color else {
            continue;
        };
        let checkpoint_id = nodes[start].id;
        let target = nodes[start].checkpoint_target.clone();
        nodes[start].border_color = Some(color);

        let mut current = checkpoint_id;
        let mut hop = 0;
        while let Some(&edge_index) = first_incoming.get(&current) {
            let edge = &mut edges[edge_index];
            if edge.highlight.is_some() {
                break;
            }
            edge.highlight = Some(EdgeHighlight {
                color,
                checkpoint: target.clone(),
                thickness: style.thickness(hop),
                z_index: style.z_index,
            });
            claimed += 1;
            hop += 1;

            let source = edge.source;
            let Some(&source_index) = position.get(&source) else {
                break;
            };
            let predecessor = &mut nodes[source_index];
            if predecessor.is_checkpoint {
                break;
            }
            predecessor.border_color = Some(color);
            current = source;
        }

        tracing::trace!(checkpoint = %checkpoint_id, hops = hop, "highlighted checkpoint path");
    }

    claimed
}
