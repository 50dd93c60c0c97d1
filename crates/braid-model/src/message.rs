//! Conversation message records
//!
//! One [`MessageRecord`] per turn, in the host application's chat-log shape:
//! `name`, `is_user`, `is_system`, `send_date`, `mes`, `swipes`, `swipe_id`,
//! `extra`. Unknown fields are ignored so newer log formats keep loading.

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The human user
    User,
    /// System / narrator message
    System,
    /// The character (model) side
    Character,
}

/// Message body as found in a log line
///
/// Logs written by older clients sometimes carry a non-string `mes`, and
/// header lines carry none at all. Only [`MessageText::Text`] takes part in
/// grouping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageText {
    /// Regular text body
    Text(String),
    /// No body (absent or null)
    #[default]
    Missing,
    /// Body present but not a string; holds the JSON kind found
    Malformed(&'static str),
}

impl MessageText {
    /// Text body, if any
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Missing | Self::Malformed(_) => None,
        }
    }

    /// Check for a usable text body
    #[inline]
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<&str> for MessageText {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessageText {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Serialize for MessageText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Missing | Self::Malformed(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MessageText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(text)) => Self::Text(text),
            Some(other) => Self::Malformed(json_kind(&other)),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Send timestamp; logs store either a formatted string or epoch millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Epoch milliseconds
    Millis(i64),
    /// Free-form date string
    Text(String),
}

/// Per-message metadata block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageExtra {
    /// Name of the log this message checkpoints into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_link: Option<String>,

    /// Everything else, preserved as-is
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

/// One turn of a conversation log
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Display name of the author
    #[serde(default)]
    pub name: String,

    /// Written by the user
    #[serde(default)]
    pub is_user: bool,

    /// System / narrator message
    #[serde(default)]
    pub is_system: bool,

    /// When the message was sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_date: Option<Timestamp>,

    /// Message body
    #[serde(rename = "mes", default)]
    pub text: MessageText,

    /// Alternate bodies offered for this turn
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_swipes")]
    pub swipes: Option<Vec<String>>,

    /// Index of the selected alternate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swipe_id: Option<usize>,

    /// Metadata block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<MessageExtra>,
}

impl MessageRecord {
    /// Create a character message with the given body
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<MessageText>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Mark as user-authored
    #[must_use]
    pub fn from_user(mut self) -> Self {
        self.is_user = true;
        self
    }

    /// Mark as system message
    #[must_use]
    pub fn from_system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// With alternate bodies
    #[must_use]
    pub fn with_swipes<I, S>(mut self, swipes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.swipes = Some(swipes.into_iter().map(Into::into).collect());
        self
    }

    /// With checkpoint link to another log
    #[must_use]
    pub fn with_bookmark(mut self, target: impl Into<String>) -> Self {
        self.extra.get_or_insert_with(MessageExtra::default).bookmark_link = Some(target.into());
        self
    }

    /// With send timestamp
    #[must_use]
    pub fn with_send_date(mut self, send_date: Timestamp) -> Self {
        self.send_date = Some(send_date);
        self
    }

    /// Author classification (system wins over user)
    #[inline]
    #[must_use]
    pub fn author(&self) -> Author {
        if self.is_system {
            Author::System
        } else if self.is_user {
            Author::User
        } else {
            Author::Character
        }
    }

    /// Checkpoint target from metadata, ignoring empty links
    #[inline]
    #[must_use]
    pub fn bookmark_link(&self) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.bookmark_link.as_deref())
            .filter(|link| !link.trim().is_empty())
    }

    /// Alternate bodies, empty when none were recorded
    #[inline]
    #[must_use]
    pub fn swipes(&self) -> &[String] {
        self.swipes.as_deref().unwrap_or_default()
    }

    /// Replace CR-LF with LF in the body and every alternate
    pub fn normalize_newlines(&mut self) {
        if let MessageText::Text(text) = &mut self.text {
            normalize_in_place(text);
        }
        if let Some(swipes) = &mut self.swipes {
            swipes.iter_mut().for_each(normalize_in_place);
        }
    }
}

fn normalize_in_place(text: &mut String) {
    if text.contains("\r\n") {
        *text = text.replace("\r\n", "\n");
    }
}

/// Swipe lists occasionally hold non-string entries; keep the strings.
fn lenient_swipes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    _ => None,
                })
                .collect(),
        )),
        Some(other) => Err(D::Error::custom(format!(
            "swipes must be an array, got {}",
            json_kind(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_host_log_line() {
        let line = r#"{"name":"Seraphina","is_user":false,"is_system":false,"send_date":"May 1, 2024 12:30pm","mes":"Hello","swipes":["Hello","Hi there"],"swipe_id":0,"extra":{"api":"openai"}}"#;
        let record: MessageRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.name, "Seraphina");
        assert_eq!(record.author(), Author::Character);
        assert_eq!(record.text, MessageText::Text("Hello".into()));
        assert_eq!(record.swipes(), ["Hello".to_string(), "Hi there".to_string()]);
        assert_eq!(record.swipe_id, Some(0));
        assert_eq!(record.bookmark_link(), None);
        assert_eq!(
            record.send_date,
            Some(Timestamp::Text("May 1, 2024 12:30pm".into()))
        );
    }

    #[test]
    fn header_line_has_missing_text() {
        let line = r#"{"user_name":"You","character_name":"Seraphina","create_date":"2024-05-01","chat_metadata":{"main_chat":""}}"#;
        let record: MessageRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.text, MessageText::Missing);
    }

    #[test]
    fn non_string_body_is_malformed() {
        let record: MessageRecord = serde_json::from_str(r#"{"mes":42}"#).unwrap();
        assert_eq!(record.text, MessageText::Malformed("number"));
        assert_eq!(record.text.as_str(), None);
    }

    #[test]
    fn empty_bookmark_link_is_ignored() {
        let record = MessageRecord::new("A", "x").with_bookmark("  ");
        assert_eq!(record.bookmark_link(), None);

        let record = MessageRecord::new("A", "x").with_bookmark("branch-2");
        assert_eq!(record.bookmark_link(), Some("branch-2"));
    }

    #[test]
    fn system_flag_wins_over_user() {
        let record = MessageRecord::new("A", "x").from_user().from_system();
        assert_eq!(record.author(), Author::System);
    }

    #[test]
    fn normalize_newlines_touches_body_and_swipes() {
        let mut record = MessageRecord::new("A", "one\r\ntwo").with_swipes(["a\r\nb", "c"]);
        record.normalize_newlines();
        assert_eq!(record.text.as_str(), Some("one\ntwo"));
        assert_eq!(record.swipes(), ["a\nb".to_string(), "c".to_string()]);
    }

    #[test]
    fn swipes_skip_non_string_entries() {
        let record: MessageRecord =
            serde_json::from_str(r#"{"mes":"a","swipes":["a",null,3,"b"]}"#).unwrap();
        assert_eq!(record.swipes(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn epoch_send_date_is_supported() {
        let record: MessageRecord =
            serde_json::from_str(r#"{"mes":"a","send_date":1714566600000}"#).unwrap();
        assert_eq!(record.send_date, Some(Timestamp::Millis(1_714_566_600_000)));
    }

    #[test]
    fn serializes_body_under_mes() {
        let record = MessageRecord::new("A", "hi");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["mes"], "hi");
        assert!(json.get("swipes").is_none());
    }
}
