//! Node synthesis from a content partition
//!
//! Author metadata comes from the first member. A node is a checkpoint when
//! any member links to another log, either through `extra.bookmark_link` or
//! through the legacy textual marker older clients wrote into the body.

use crate::color::color_for;
use crate::preprocess::DepthEntry;
use crate::types::{GraphNode, MessageLocation, NodeId, NodeKind};
use braid_model::{Author, LogId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Legacy checkpoint body: marker sentence followed by an anchor naming the log
static LEGACY_CHECKPOINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)(?:Bookmark|Checkpoint) created!.*?file_name="([^"]+)""#)
        .expect("legacy checkpoint pattern is valid")
});

/// How a checkpoint was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// `extra.bookmark_link`
    Metadata,
    /// Marker text in the message body
    LegacyText,
}

/// Detect a checkpoint target among partition members
///
/// Metadata on any member wins over the legacy text marker.
#[must_use]
pub fn detect_checkpoint(members: &[DepthEntry]) -> Option<(String, CheckpointSource)> {
    if let Some(link) = members.iter().find_map(|m| m.record.bookmark_link()) {
        return Some((link.to_string(), CheckpointSource::Metadata));
    }

    members.iter().find_map(|m| {
        let text = m.record.text.as_str()?;
        let captures = LEGACY_CHECKPOINT.captures(text)?;
        let target = captures.get(1)?.as_str().trim();
        (!target.is_empty()).then(|| (target.to_string(), CheckpointSource::LegacyText))
    })
}

/// Build a graph node for one content partition
///
/// `log_lengths` holds every log of this build; a checkpoint whose target is
/// not among them is demoted to a plain node.
#[must_use]
pub fn synthesize_node(
    id: NodeId,
    depth: u32,
    text: String,
    members: &[DepthEntry],
    log_lengths: &BTreeMap<LogId, usize>,
) -> GraphNode {
    let first = members.first().map(|m| &m.record);
    let name = first.map(|r| r.name.clone()).unwrap_or_default();
    let author = first.map_or(Author::Character, braid_model::MessageRecord::author);
    let send_date = first.and_then(|r| r.send_date.clone());

    let checkpoint_target = detect_checkpoint(members).and_then(|(target, source)| {
        if log_lengths.contains_key(target.as_str()) {
            LogId::new(target).ok()
        } else {
            tracing::warn!(
                node = %id,
                target = %target,
                ?source,
                "checkpoint target is not a known log, demoting"
            );
            None
        }
    });
    let is_checkpoint = checkpoint_target.is_some();
    let color = is_checkpoint.then(|| color_for(Some(&text)));

    let sessions = members
        .iter()
        .map(|m| {
            let location = MessageLocation {
                depth,
                message_index: m.position,
                log_length: log_lengths.get(&m.log).copied().unwrap_or(0),
            };
            (m.log.clone(), location)
        })
        .collect();

    GraphNode {
        id,
        kind: NodeKind::Message,
        depth,
        text,
        name,
        author,
        send_date,
        is_checkpoint,
        checkpoint_target,
        color,
        border_color: None,
        total_swipes: 0,
        current_swipe_index: -1,
        swipe_index: None,
        sessions,
    }
}
