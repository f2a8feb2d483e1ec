//! Storage backends for document collections.

mod memory;
mod row;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::{SqliteLocation, SqliteStore};
pub use traits::DocumentStore;

use crate::document::{Document, ID_FIELD};
use crate::error::{CoinbankError, Result};

/// Identifiers are store-assigned; callers may not supply their own.
fn ensure_no_id(document: &Document) -> Result<()> {
    if document.contains_key(ID_FIELD) {
        return Err(CoinbankError::InvalidInput(
            "Documents must not carry an _id; the store assigns one".to_string(),
        ));
    }
    Ok(())
}

/// Strip the id before persisting a document body.
fn stored_body(mut document: Document) -> Document {
    document.remove(ID_FIELD);
    document
}
