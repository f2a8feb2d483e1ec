//! Document row type for SQLite queries.

use crate::document::{to_document, Document, DocumentId, ID_FIELD};
use crate::error::{CoinbankError, Result};

/// Raw row data from the documents table, before parsing.
#[derive(Debug)]
pub struct DocumentRow {
    pub id: String,
    pub body_json: String,
}

impl DocumentRow {
    pub fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            body_json: row.get(1)?,
        })
    }
}

impl TryFrom<DocumentRow> for Document {
    type Error = CoinbankError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        let id = DocumentId::parse_str(&row.id)
            .map_err(|e| CoinbankError::Storage(format!("Invalid document id: {}", e)))?;
        let body: serde_json::Value = serde_json::from_str(&row.body_json)
            .map_err(|e| CoinbankError::Storage(format!("Invalid JSON: {}", e)))?;
        let mut document = to_document(body)
            .map_err(|e| CoinbankError::Storage(format!("Invalid document body: {}", e)))?;
        document.insert(ID_FIELD.to_string(), id.into());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_restores_id_field() {
        let id = DocumentId::generate();
        let row = DocumentRow {
            id: id.to_string(),
            body_json: r#"{"name":"foo","amount":0}"#.to_string(),
        };

        let document = Document::try_from(row).unwrap();
        assert_eq!(document.get("_id"), Some(&json!(id.to_string())));
        assert_eq!(document.get("amount"), Some(&json!(0)));
    }

    #[test]
    fn test_row_with_corrupt_body_is_storage_error() {
        let row = DocumentRow {
            id: DocumentId::generate().to_string(),
            body_json: "[1,2]".to_string(),
        };
        assert!(matches!(
            Document::try_from(row),
            Err(CoinbankError::Storage(_))
        ));
    }
}
