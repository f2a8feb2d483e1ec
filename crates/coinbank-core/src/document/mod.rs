//! Document model shared by every storage backend.
//!
//! A document is a schema-flexible JSON object. The store assigns each
//! document a [`DocumentId`], kept under the reserved [`ID_FIELD`] key.
//! Filters select documents and updates modify them; both are parsed from
//! JSON so callers can pass arbitrary expressions through unchanged.

mod filter;
mod update;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CoinbankError, Result};

pub use filter::Filter;
pub use update::{Update, UpdateOutcome};

/// Reserved key holding the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Opaque, store-assigned document identifier (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier. Only storage backends should call this.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse an identifier from its hyphenated string form.
    pub fn parse_str(value: &str) -> Result<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| {
                CoinbankError::InvalidInput(format!("Invalid document id '{}': {}", value, e))
            })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = CoinbankError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.to_string())
    }
}

/// Convert an arbitrary JSON value into a document.
///
/// # Errors
///
/// Returns `CoinbankError::InvalidInput` if the value is not a JSON object.
pub fn to_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoinbankError::InvalidInput(format!(
            "Expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Read the identifier stored in a document.
pub fn document_id(document: &Document) -> Result<DocumentId> {
    match document.get(ID_FIELD) {
        Some(Value::String(value)) => DocumentId::parse_str(value)
            .map_err(|e| CoinbankError::Storage(format!("Corrupt document id: {}", e))),
        Some(other) => Err(CoinbankError::Storage(format!(
            "Document id must be a string, got {}",
            json_kind(other)
        ))),
        None => Err(CoinbankError::Storage("Document has no id".to_string())),
    }
}

/// Look up a dotted field path (`"profile.name"`) inside a document.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Validate a dotted field path used in a filter or update.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.split('.').any(|segment| segment.is_empty()) {
        return Err(CoinbankError::InvalidInput(format!(
            "Invalid field path '{}'",
            path
        )));
    }
    if path.split('.').any(|segment| segment.starts_with('$')) {
        return Err(CoinbankError::InvalidInput(format!(
            "Field path '{}' must not contain operators",
            path
        )));
    }
    Ok(())
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_round_trips_through_string() {
        let id = DocumentId::generate();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_invalid_id_is_invalid_input() {
        let err = DocumentId::parse_str("not-an-id").unwrap_err();
        assert!(matches!(err, CoinbankError::InvalidInput(_)));
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(to_document(json!({"name": "foo"})).is_ok());
        assert!(matches!(
            to_document(json!([1, 2])),
            Err(CoinbankError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_path_descends_nested_objects() {
        let doc = to_document(json!({"profile": {"name": "foo"}, "amount": 3})).unwrap();
        assert_eq!(get_path(&doc, "profile.name"), Some(&json!("foo")));
        assert_eq!(get_path(&doc, "amount"), Some(&json!(3)));
        assert_eq!(get_path(&doc, "amount.value"), None);
        assert_eq!(get_path(&doc, "missing"), None);
    }

    #[test]
    fn test_document_id_reads_stored_id() {
        let id = DocumentId::generate();
        let doc = to_document(json!({ "_id": id.to_string() })).unwrap();
        assert_eq!(document_id(&doc).unwrap(), id);

        let missing = Document::new();
        assert!(document_id(&missing).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("amount").is_ok());
        assert!(validate_path("profile.name").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("a..b").is_err());
        assert!(validate_path("$inc").is_err());
    }
}
