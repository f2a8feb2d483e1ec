//! SQLite-backed document store.
//!
//! Documents live in one table shared by every collection, keyed by a
//! store-generated id and ordered by an autoincrement sequence. Bodies are
//! JSON text without the `_id` field; the id column is authoritative and is
//! merged back in when rows are read.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::row::DocumentRow;
use super::traits::DocumentStore;
use super::{ensure_no_id, stored_body};
use crate::document::{Document, DocumentId, Filter, Update, UpdateOutcome};
use crate::error::{CoinbankError, Result};

/// Where a SQLite database lives, parsed from a connection URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    Memory,
    File(PathBuf),
}

impl SqliteLocation {
    /// Parse `sqlite://<path>`, `sqlite::memory:`, `:memory:`, or a bare path.
    pub fn parse(uri: &str) -> Result<Self> {
        let trimmed = uri.trim();
        let rest = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);

        if rest.is_empty() {
            return Err(CoinbankError::InvalidInput(format!(
                "Connection URI '{}' has no database path",
                uri
            )));
        }
        if rest == ":memory:" {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(rest)))
    }
}

/// A document collection stored in SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteStore {
    const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            collection TEXT NOT NULL,
            id TEXT NOT NULL UNIQUE,
            body_json TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS documents_by_collection
            ON documents(collection, seq);
    "#;

    /// Open the collection named `collection` in the database at `uri`.
    ///
    /// The database file and schema are created if missing.
    pub fn open(uri: &str, collection: &str) -> Result<Self> {
        match SqliteLocation::parse(uri)? {
            SqliteLocation::Memory => Self::open_in_memory(collection),
            SqliteLocation::File(path) => Self::open_path(&path, collection),
        }
    }

    pub fn open_path(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoinbankError::Storage(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), collection, "opened sqlite document store");
        Self::init(conn, collection)
    }

    pub fn open_in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, collection)
    }

    fn init(conn: Connection, collection: &str) -> Result<Self> {
        if collection.trim().is_empty() {
            return Err(CoinbankError::InvalidInput(
                "Collection name must not be empty".to_string(),
            ));
        }
        conn.execute_batch(Self::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoinbankError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Load candidate rows in insertion order, narrowed by id when the
    /// filter pins one.
    fn load(conn: &Connection, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let rows: Vec<DocumentRow> = match filter.id_hint() {
            Some(id) => {
                let mut stmt = conn.prepare(
                    "SELECT id, body_json FROM documents WHERE collection = ?1 AND id = ?2",
                )?;
                let rows =
                    stmt.query_map(params![collection, id.to_string()], DocumentRow::from_sql)?;
                rows.collect::<rusqlite::Result<_>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, body_json FROM documents WHERE collection = ?1 ORDER BY seq",
                )?;
                let rows = stmt.query_map(params![collection], DocumentRow::from_sql)?;
                rows.collect::<rusqlite::Result<_>>()?
            }
        };

        let mut documents = Vec::new();
        for row in rows {
            let document = Document::try_from(row)?;
            if filter.matches(&document) {
                documents.push(document);
            }
        }
        Ok(documents)
    }
}

impl DocumentStore for SqliteStore {
    fn insert_one(&mut self, document: &Document) -> Result<DocumentId> {
        ensure_no_id(document)?;

        let id = DocumentId::generate();
        let body_json = serde_json::to_string(document)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body_json) VALUES (?1, ?2, ?3)",
            params![self.collection, id.to_string(), body_json],
        )?;
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let conn = self.lock()?;
        Ok(Self::load(&conn, &self.collection, filter)?.into_iter().next())
    }

    fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        Self::load(&conn, &self.collection, filter)
    }

    fn update_by_id(&mut self, id: &DocumentId, update: &Update) -> Result<UpdateOutcome> {
        update.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let row = tx
            .query_row(
                "SELECT id, body_json FROM documents WHERE collection = ?1 AND id = ?2",
                params![self.collection, id.to_string()],
                DocumentRow::from_sql,
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(UpdateOutcome::not_found());
        };

        let mut document = Document::try_from(row)?;
        let modified = update.apply(&mut document)?;
        if modified {
            let body_json = serde_json::to_string(&stored_body(document))?;
            tx.execute(
                "UPDATE documents SET body_json = ?1 WHERE collection = ?2 AND id = ?3",
                params![body_json, self.collection, id.to_string()],
            )?;
        }
        tx.commit()?;

        Ok(UpdateOutcome::applied(modified))
    }

    fn delete_many(&mut self, filter: &Filter) -> Result<usize> {
        let mut conn = self.lock()?;

        if filter.is_empty() {
            let deleted = conn.execute(
                "DELETE FROM documents WHERE collection = ?1",
                params![self.collection],
            )?;
            return Ok(deleted);
        }

        let matching = Self::load(&conn, &self.collection, filter)?;
        let tx = conn.transaction()?;
        let mut deleted = 0;
        for document in &matching {
            let id = crate::document::document_id(document)?;
            deleted += tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![self.collection, id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(deleted)
    }
}
