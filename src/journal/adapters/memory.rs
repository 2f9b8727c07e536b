//! In-memory journal field store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::journal::ports::{
    JournalFieldError, JournalFieldRepository, JournalFieldResult, JournalOwner,
};

/// Thread-safe in-memory stand-in for the journal text columns.
///
/// Owners must be attached before they accept journal text, mirroring the
/// relational store where the column exists only on live parent rows;
/// detaching an owner simulates its soft-deletion.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJournalField {
    state: Arc<RwLock<BTreeMap<JournalOwner, String>>>,
}

fn lock_poisoned<E: std::fmt::Display>(err: E) -> JournalFieldError {
    JournalFieldError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryJournalField {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live owner with an empty journal.
    ///
    /// # Errors
    ///
    /// Returns [`JournalFieldError`] when the backing lock is poisoned.
    pub fn attach(&self, owner: JournalOwner) -> JournalFieldResult<()> {
        self.attach_with_text(owner, "")
    }

    /// Registers a live owner with existing journal text.
    ///
    /// # Errors
    ///
    /// Returns [`JournalFieldError`] when the backing lock is poisoned.
    pub fn attach_with_text(&self, owner: JournalOwner, text: &str) -> JournalFieldResult<()> {
        let mut fields = self.state.write().map_err(lock_poisoned)?;
        fields.insert(owner, text.to_owned());
        Ok(())
    }

    /// Removes an owner, as a stand-in for its soft-deletion.
    ///
    /// # Errors
    ///
    /// Returns [`JournalFieldError`] when the backing lock is poisoned.
    pub fn detach(&self, owner: JournalOwner) -> JournalFieldResult<()> {
        let mut fields = self.state.write().map_err(lock_poisoned)?;
        fields.remove(&owner);
        Ok(())
    }
}

#[async_trait]
impl JournalFieldRepository for InMemoryJournalField {
    async fn read(&self, owner: JournalOwner) -> JournalFieldResult<Option<String>> {
        let fields = self.state.read().map_err(lock_poisoned)?;
        Ok(fields.get(&owner).cloned())
    }

    async fn write(&self, owner: JournalOwner, text: &str) -> JournalFieldResult<()> {
        let mut fields = self.state.write().map_err(lock_poisoned)?;
        let Some(field) = fields.get_mut(&owner) else {
            return Err(JournalFieldError::UnknownOwner(owner));
        };
        text.clone_into(field);
        Ok(())
    }
}
