// Strong Types - newtypes for document identity
// Ids travel as decimal strings in JSON so 64-bit values survive JavaScript clients

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Strongly-typed document id - a snowflake id unique across collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(pub i64);

impl DocId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Generated ids are always positive
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(DocId)
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<DocId> for i64 {
    fn from(id: DocId) -> Self {
        id.0
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocIdVisitor;

        impl de::Visitor<'_> for DocIdVisitor {
            type Value = DocId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a document id as a decimal string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<DocId, E> {
                v.parse().map_err(|_| E::custom(format!("invalid document id '{}'", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<DocId, E> {
                Ok(DocId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<DocId, E> {
                i64::try_from(v)
                    .map(DocId)
                    .map_err(|_| E::custom("document id out of range"))
            }
        }

        deserializer.deserialize_any(DocIdVisitor)
    }
}

/// Collection names are lowercase with underscores, safe to embed in DDL
pub fn is_collection_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Field names are camelCase identifiers; anything else is refused before
/// it reaches a JSON path or an index definition
pub fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_serializes_as_string() {
        let id = DocId::new(7_312_994_012_345_678_901);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"7312994012345678901\"");

        let back: DocId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let from_number: DocId = serde_json::from_str("42").unwrap();
        assert_eq!(from_number.value(), 42);
    }

    #[test]
    fn test_doc_id_rejects_garbage() {
        assert!(serde_json::from_str::<DocId>("\"abc\"").is_err());
        assert!("64f1c0ffee".parse::<DocId>().is_err());
        assert!(!DocId::new(-1).is_valid());
    }

    #[test]
    fn test_collection_name_validation() {
        assert!(is_collection_name("donated_items"));
        assert!(!is_collection_name(""));
        assert!(!is_collection_name("Listings"));
        assert!(!is_collection_name("users; DROP"));
    }

    #[test]
    fn test_field_name_validation() {
        assert!(is_field_name("externalId"));
        assert!(is_field_name("price"));
        assert!(!is_field_name("$.price"));
        assert!(!is_field_name("1abc"));
        assert!(!is_field_name("a'b"));
    }
}
