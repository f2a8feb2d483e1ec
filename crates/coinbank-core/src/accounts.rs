//! Account store: create, read, and update accounts in a document collection.
//!
//! Every operation is a single call on the underlying [`DocumentStore`].
//! Failures are logged here and returned to the caller; nothing in this
//! module terminates the process.

use tracing::{debug, error, warn};

use crate::account::{amount_number, Account, NewAccount, AMOUNT_FIELD, HARD_CHORE_REWARD};
use crate::document::{Document, DocumentId, Filter, Update, UpdateOutcome};
use crate::error::Result;
use crate::storage::DocumentStore;

/// Account operations over a caller-owned collection handle.
pub struct AccountStore<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> AccountStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Hand the collection handle back to the caller.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Insert an arbitrary document and return its generated identifier.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; the failure is also logged.
    pub fn create(&mut self, data: &Document) -> Result<DocumentId> {
        match self.store.insert_one(data) {
            Ok(id) => {
                debug!(%id, "created account");
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, "unable to create account");
                Err(err)
            }
        }
    }

    /// Insert a typed account.
    pub fn create_account(&mut self, account: &NewAccount) -> Result<DocumentId> {
        let document = account.to_document()?;
        self.create(&document)
    }

    /// Find the first document matching `filter`, undecoded.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub fn read_document(&self, filter: &Filter) -> Result<Option<Document>> {
        match self.store.find_one(filter) {
            Ok(Some(document)) => Ok(Some(document)),
            Ok(None) => {
                warn!(?filter, "unable to find account: no matching document");
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "unable to find account");
                Err(err)
            }
        }
    }

    /// Find the first account matching `filter`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when nothing matches, so "absent" is never confused
    /// with an account whose fields are all empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the matching document cannot be
    /// decoded as an account.
    pub fn read(&self, filter: &Filter) -> Result<Option<Account>> {
        let Some(document) = self.read_document(filter)? else {
            return Ok(None);
        };
        Account::try_from(document).map(Some).map_err(|err| {
            warn!(error = %err, "unable to decode account");
            err
        })
    }

    /// Find an account by identifier.
    pub fn get(&self, id: &DocumentId) -> Result<Option<Account>> {
        self.read(&Filter::by_id(*id))
    }

    /// List every account matching `filter`, in insertion order.
    pub fn list(&self, filter: &Filter) -> Result<Vec<Account>> {
        self.store
            .find(filter)
            .map_err(|err| {
                warn!(error = %err, "unable to list accounts");
                err
            })?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Apply an update expression to the account with this identifier.
    ///
    /// An unknown identifier is a successful no-op with `matched == 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is malformed or cannot be applied; the
    /// stored account is left unchanged.
    pub fn update(&mut self, id: &DocumentId, update: &Update) -> Result<UpdateOutcome> {
        match self.store.update_by_id(id, update) {
            Ok(outcome) if !outcome.is_match() => {
                warn!(%id, "unable to update account: no account with that id");
                Ok(outcome)
            }
            Ok(outcome) => {
                debug!(%id, modified = outcome.modified, "updated account");
                Ok(outcome)
            }
            Err(err) => {
                warn!(%id, error = %err, "unable to update account");
                Err(err)
            }
        }
    }

    /// Add `amount` to an account's balance.
    pub fn deposit(&mut self, id: &DocumentId, amount: f64) -> Result<UpdateOutcome> {
        let update = Update::new().inc(AMOUNT_FIELD, amount_number(amount)?);
        self.update(id, &update)
    }

    /// Credit the hard chore reward.
    pub fn reward_chore(&mut self, id: &DocumentId) -> Result<UpdateOutcome> {
        let update = Update::new().inc(AMOUNT_FIELD, HARD_CHORE_REWARD);
        self.update(id, &update)
    }
}
