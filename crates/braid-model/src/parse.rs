//! JSONL log parsing
//!
//! A log file holds one JSON object per line. The first line of a host log
//! is usually a header (chat metadata, no `mes`); it is kept as a record
//! with [`MessageText::Missing`](crate::MessageText::Missing) so message
//! positions line up with what the host application shows.

use crate::message::MessageRecord;

/// Errors while parsing a log
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A line is not a valid JSON object
    #[error("invalid record on line {line}: {source}")]
    InvalidLine {
        /// 1-based line number
        line: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a whole JSONL log into records, skipping blank lines
///
/// # Errors
/// Returns error on the first line that is not a valid record
pub fn parse_jsonl(input: &str) -> Result<Vec<MessageRecord>, ParseError> {
    let mut records = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<MessageRecord>(line).map_err(|source| {
            ParseError::InvalidLine {
                line: index + 1,
                source,
            }
        })?;
        records.push(record);
    }
    tracing::trace!(records = records.len(), "parsed jsonl log");
    Ok(records)
}

/// Serialize records back into JSONL
///
/// # Errors
/// Returns error if a record fails to serialize
pub fn to_jsonl(records: &[MessageRecord]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}
