//! Index document data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed scalar decoded from an index document element.
///
/// The element tag decides the variant; 32-bit integers are widened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl IndexValue {
    /// Borrow the string payload, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, if this is an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Summary of one completed indexing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Digest algorithm the index was produced with (e.g. `SHA256`)
    pub algorithm: String,
    /// Every named scalar member of the root object, known or not
    pub meta: BTreeMap<String, IndexValue>,
    /// Sum of `length` over items that carry no recorded error
    pub total_bytes: u64,
}

impl RunInfo {
    /// Root directory the index was taken from
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.meta_str("root")
    }

    #[must_use]
    pub fn created_utc(&self) -> Option<&str> {
        self.meta_str("createdUtc")
    }

    #[must_use]
    pub fn started_utc(&self) -> Option<&str> {
        self.meta_str("startedUtc")
    }

    /// Item count as recorded by the producer
    #[must_use]
    pub fn total(&self) -> Option<i64> {
        self.meta_int("total")
    }

    #[must_use]
    pub fn ok_count(&self) -> Option<i64> {
        self.meta_int("okCount")
    }

    #[must_use]
    pub fn error_count(&self) -> Option<i64> {
        self.meta_int("errorCount")
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(IndexValue::as_str)
    }

    fn meta_int(&self, key: &str) -> Option<i64> {
        self.meta.get(key).and_then(IndexValue::as_int)
    }
}

/// One file as it was known at index time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFileItem {
    pub ok: bool,
    pub path: String,
    pub length: u64,
    /// Hex digest recorded by the indexer
    pub hash: String,
    /// Set when the indexer itself failed on this file; the hash is then
    /// not trustworthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IndexedFileItem {
    /// Whether the indexer recorded a failure for this file
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_info_accessors() {
        let mut meta = BTreeMap::new();
        meta.insert("root".to_string(), IndexValue::Str(r"\\nas\media".into()));
        meta.insert("total".to_string(), IndexValue::Int(3));
        meta.insert("okCount".to_string(), IndexValue::Str("2".into()));
        let run = RunInfo {
            algorithm: "SHA256".into(),
            meta,
            total_bytes: 0,
        };

        assert_eq!(run.root(), Some(r"\\nas\media"));
        assert_eq!(run.total(), Some(3));
        // Only native integers count; textual values stay opaque metadata
        assert_eq!(run.ok_count(), None);
        assert_eq!(run.created_utc(), None);
    }

    #[test]
    fn test_index_value_serializes_untagged() {
        let json = serde_json::to_string(&IndexValue::Int(7)).unwrap();
        assert_eq!(json, "7");
        let json = serde_json::to_string(&IndexValue::Nil).unwrap();
        assert_eq!(json, "null");
    }
}
