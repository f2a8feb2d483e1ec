//! In-memory document store for tests and ephemeral use.

use super::traits::DocumentStore;
use super::ensure_no_id;
use crate::document::{document_id, Document, DocumentId, Filter, Update, UpdateOutcome, ID_FIELD};
use crate::error::Result;

/// Insertion-ordered document collection held in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn position(&self, id: &DocumentId) -> Option<usize> {
        self.documents
            .iter()
            .position(|document| document_id(document).is_ok_and(|stored| stored == *id))
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&mut self, document: &Document) -> Result<DocumentId> {
        ensure_no_id(document)?;

        let id = DocumentId::generate();
        let mut stored = document.clone();
        stored.insert(ID_FIELD.to_string(), id.into());
        self.documents.push(stored);
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self
            .documents
            .iter()
            .find(|document| filter.matches(document))
            .cloned())
    }

    fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .documents
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect())
    }

    fn update_by_id(&mut self, id: &DocumentId, update: &Update) -> Result<UpdateOutcome> {
        update.validate()?;

        let Some(index) = self.position(id) else {
            return Ok(UpdateOutcome::not_found());
        };
        let modified = update.apply(&mut self.documents[index])?;
        Ok(UpdateOutcome::applied(modified))
    }

    fn delete_many(&mut self, filter: &Filter) -> Result<usize> {
        let before = self.documents.len();
        self.documents.retain(|document| !filter.matches(document));
        Ok(before - self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::to_document;
    use crate::error::CoinbankError;
    use serde_json::json;

    #[test]
    fn test_insert_assigns_id() {
        let mut store = MemoryStore::new();
        let id = store
            .insert_one(&to_document(json!({"name": "foo"})).unwrap())
            .unwrap();

        assert_eq!(store.len(), 1);
        let found = store.find_one(&Filter::by_id(id)).unwrap().unwrap();
        assert_eq!(document_id(&found).unwrap(), id);
    }

    #[test]
    fn test_insert_with_id_rejected() {
        let mut store = MemoryStore::new();
        let document = to_document(json!({"_id": "mine", "name": "foo"})).unwrap();

        assert!(matches!(
            store.insert_one(&document),
            Err(CoinbankError::InvalidInput(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_reports_modification() {
        let mut store = MemoryStore::new();
        let id = store
            .insert_one(&to_document(json!({"amount": 0})).unwrap())
            .unwrap();

        let changed = store.update_by_id(&id, &Update::new().inc("amount", 1)).unwrap();
        assert_eq!(changed, UpdateOutcome::applied(true));

        let unchanged = store.update_by_id(&id, &Update::new().set("amount", 1)).unwrap();
        assert_eq!(unchanged, UpdateOutcome::applied(false));
    }
}
