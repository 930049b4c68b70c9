//! Common types used throughout docuvault.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a member record.
///
/// Assigned by the record store on creation, never reused or mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl MemberId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl DocumentId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of scanned document attached to a member.
///
/// Closed set; values outside it coerce to [`DocType::Other`] rather than
/// being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Photo,
    CitizenshipFront,
    CitizenshipBack,
    Nid,
    Pan,
    #[default]
    Other,
}

impl DocType {
    /// Stable string form, matching the stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Photo => "photo",
            DocType::CitizenshipFront => "citizenship_front",
            DocType::CitizenshipBack => "citizenship_back",
            DocType::Nid => "nid",
            DocType::Pan => "pan",
            DocType::Other => "other",
        }
    }

    /// Parse a declared doc type, silently coercing anything unknown
    /// (including the empty string) to [`DocType::Other`].
    pub fn parse_or_other(value: &str) -> Self {
        match value {
            "photo" => DocType::Photo,
            "citizenship_front" => DocType::CitizenshipFront,
            "citizenship_back" => DocType::CitizenshipBack,
            "nid" => DocType::Nid,
            "pan" => DocType::Pan,
            _ => DocType::Other,
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_roundtrip() {
        for ty in [
            DocType::Photo,
            DocType::CitizenshipFront,
            DocType::CitizenshipBack,
            DocType::Nid,
            DocType::Pan,
            DocType::Other,
        ] {
            assert_eq!(DocType::parse_or_other(ty.as_str()), ty);
        }
    }

    #[test]
    fn test_doc_type_coercion() {
        assert_eq!(DocType::parse_or_other("passport"), DocType::Other);
        assert_eq!(DocType::parse_or_other(""), DocType::Other);
        assert_eq!(DocType::parse_or_other("PHOTO"), DocType::Other);
    }

    #[test]
    fn test_doc_type_serde() {
        let json = serde_json::to_string(&DocType::CitizenshipFront).unwrap();
        assert_eq!(json, "\"citizenship_front\"");
        let back: DocType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocType::CitizenshipFront);
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(MemberId(7).to_string(), "7");
        assert_eq!(DocumentId(42).to_string(), "42");
    }
}
