//! Log and subject identifiers
//!
//! A [`LogId`] names one recorded conversation (one branch). A [`Subject`]
//! names the owner of a set of logs: a character, or a group chat.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Name of one conversation log (file stem, without extension)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct LogId(String);

impl LogId {
    /// Create log id
    ///
    /// # Errors
    /// Returns error if the name is empty or would escape its directory
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_segment(&value)?;
        Ok(Self(value))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned name
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for LogId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LogId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for LogId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Owner of a set of logs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Character directory name or group id
    pub id: String,
    /// Whether `id` names a group chat
    pub is_group: bool,
}

impl Subject {
    /// Create character subject
    ///
    /// # Errors
    /// Returns error if the id is empty or contains a path separator
    pub fn character(id: impl Into<String>) -> Result<Self, IdError> {
        Self::new(id, false)
    }

    /// Create group subject
    ///
    /// # Errors
    /// Returns error if the id is empty or contains a path separator
    pub fn group(id: impl Into<String>) -> Result<Self, IdError> {
        Self::new(id, true)
    }

    /// Create subject with explicit group flag
    ///
    /// # Errors
    /// Returns error if the id is empty or contains a path separator
    pub fn new(id: impl Into<String>, is_group: bool) -> Result<Self, IdError> {
        let id = id.into();
        validate_segment(&id)?;
        Ok(Self { id, is_group })
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_group {
            write!(f, "group:{}", self.id)
        } else {
            write!(f, "character:{}", self.id)
        }
    }
}

/// Identifier validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// Empty identifier
    #[error("identifier must not be empty")]
    Empty,

    /// Identifier contains a path separator or parent reference
    #[error("identifier must be a single path segment: '{0}'")]
    NotASegment(String),
}

fn validate_segment(value: &str) -> Result<(), IdError> {
    if value.trim().is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') || value.contains('\\') || value == ".." || value == "." {
        return Err(IdError::NotASegment(value.to_string()));
    }
    Ok(())
}
