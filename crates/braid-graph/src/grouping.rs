//! Content grouping within one depth
//!
//! Messages with identical text (after CR-LF normalization) collapse into a
//! single partition, whichever log they came from. Partitions keep
//! first-seen order so node ids come out the same on every build.

use crate::preprocess::{DepthEntry, DepthGroup};
use braid_model::MessageText;
use indexmap::IndexMap;

/// Members of a depth keyed by their exact normalized text
pub type ContentPartitions = IndexMap<String, Vec<DepthEntry>>;

/// Partition a depth group by normalized text
///
/// Entries without a usable text body are logged and dropped from this
/// depth only; the rest of the log is unaffected.
#[must_use]
pub fn group_by_content(group: DepthGroup) -> ContentPartitions {
    let mut partitions = ContentPartitions::new();

    for mut entry in group.entries {
        entry.record.normalize_newlines();
        let key = match &entry.record.text {
            MessageText::Text(text) => text.clone(),
            MessageText::Missing => {
                tracing::debug!(
                    log = %entry.log,
                    position = entry.position,
                    "skipping message without text"
                );
                continue;
            }
            MessageText::Malformed(kind) => {
                tracing::warn!(
                    log = %entry.log,
                    position = entry.position,
                    kind,
                    "skipping message with malformed text"
                );
                continue;
            }
        };
        partitions.entry(key).or_default().push(entry);
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::transpose;
    use braid_model::MessageRecord;
    use braid_test_utils::{log_id, LogSetBuilder};

    #[test]
    fn identical_text_collapses_across_logs() {
        let input = LogSetBuilder::new()
            .text_log("a", &["hi"])
            .text_log("b", &["hi"])
            .text_log("c", &["hey"])
            .build();
        let mut groups = transpose(&input);
        let partitions = group_by_content(groups.remove(0));

        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions["hi"].len(), 2);
        assert_eq!(partitions["hey"].len(), 1);
    }

    #[test]
    fn crlf_and_lf_are_the_same_text() {
        let input = LogSetBuilder::new()
            .text_log("a", &["one\r\ntwo"])
            .text_log("b", &["one\ntwo"])
            .build();
        let mut groups = transpose(&input);
        let partitions = group_by_content(groups.remove(0));

        assert_eq!(partitions.len(), 1);
        let members = &partitions["one\ntwo"];
        assert!(members
            .iter()
            .all(|m| m.record.text.as_str() == Some("one\ntwo")));
    }

    #[test]
    fn keeps_first_seen_order() {
        let input = LogSetBuilder::new()
            .text_log("a", &["zeta"])
            .text_log("b", &["alpha"])
            .text_log("c", &["zeta"])
            .build();
        let mut groups = transpose(&input);
        let partitions = group_by_content(groups.remove(0));
        let keys: Vec<&str> = partitions.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn missing_and_malformed_text_are_excluded() {
        let input = LogSetBuilder::new()
            .log("a", vec![MessageRecord::default()])
            .log("b", vec![MessageRecord {
                text: MessageText::Malformed("number"),
                ..MessageRecord::default()
            }])
            .log("c", vec![MessageRecord::new("Bot", "ok")])
            .build();
        let mut groups = transpose(&input);
        let partitions = group_by_content(groups.remove(0));

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions["ok"][0].log, log_id("c"));
    }
}
