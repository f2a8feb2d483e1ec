//! Document store trait definition.
//!
//! The `DocumentStore` trait is the collection handle the account store is
//! built on. It mirrors what a document database driver offers for a single
//! collection, so backends (SQLite, in-memory) can be swapped without
//! touching account logic.

use crate::document::{Document, DocumentId, Filter, Update, UpdateOutcome};
use crate::error::Result;

/// A single collection of schema-flexible documents.
///
/// All implementations must ensure:
/// - Identifiers are assigned by the store and never change
/// - Each call is applied atomically or not at all
/// - Documents are returned in insertion order
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its generated identifier.
    ///
    /// The stored document carries the identifier under `_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::InvalidInput` if the document already has an
    /// `_id`, or `CoinbankError::Storage` if the backend write fails.
    fn insert_one(&mut self, document: &Document) -> Result<DocumentId>;

    /// Find the first document matching the filter.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(document))` if found, `Ok(None)` if nothing matches.
    fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Find every document matching the filter.
    fn find(&self, filter: &Filter) -> Result<Vec<Document>>;

    /// Count documents matching the filter.
    fn count(&self, filter: &Filter) -> Result<usize> {
        Ok(self.find(filter)?.len())
    }

    /// Apply an update to the document with this identifier.
    ///
    /// A missing identifier is not an error: the outcome reports
    /// `matched == 0` and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `CoinbankError::InvalidInput` or `CoinbankError::Validation`
    /// if the update cannot be applied; the stored document is unchanged.
    fn update_by_id(&mut self, id: &DocumentId, update: &Update) -> Result<UpdateOutcome>;

    /// Delete every document matching the filter, returning how many went.
    fn delete_many(&mut self, filter: &Filter) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definition_compiles() {
        fn _accepts_document_store<T: DocumentStore>(_store: T) {}
    }
}
