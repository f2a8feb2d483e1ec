//! # Coinbank Core
//!
//! Core library for Coinbank - a minimal account ledger backed by a
//! document store.
//!
//! This crate provides the account model, the document store abstraction,
//! and the account operations, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **document**: documents, identifiers, filter and update expressions
//! - **storage**: `DocumentStore` trait with SQLite and in-memory backends
//! - **account**: account data model
//! - **accounts**: account store (create, read, update)

pub mod account;
pub mod accounts;
pub mod document;
pub mod error;
pub mod storage;

pub use account::{Account, NewAccount, HARD_CHORE_REWARD};
pub use accounts::AccountStore;
pub use document::{Document, DocumentId, Filter, Update, UpdateOutcome};
pub use error::{CoinbankError, Result};
pub use storage::{DocumentStore, MemoryStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
