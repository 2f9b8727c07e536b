//! Journal orchestration: wire parsing and composition to the field port.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tracing::debug;

use crate::journal::domain::{Journal, JournalEntry};
use crate::journal::ports::{JournalFieldError, JournalFieldRepository, JournalOwner};

/// Result type for journal service operations.
pub type JournalServiceResult<T> = Result<T, JournalServiceError>;

/// Infrastructure errors surfaced by journal operations.
#[derive(Debug, Error)]
pub enum JournalServiceError {
    /// The field accessor failed.
    #[error(transparent)]
    Field(#[from] JournalFieldError),
}

/// Result of appending an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The entry was spliced at the head of the active section.
    Appended {
        /// Content identifier of the new entry.
        entry_id: String,
    },
    /// The owner is missing or soft-deleted; nothing was written.
    OwnerNotFound,
}

/// Result of moving an entry between the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMoveOutcome {
    /// The entry changed section.
    Moved,
    /// No entry with the given identifier in the source section.
    EntryNotFound,
    /// The owner is missing or soft-deleted; nothing was written.
    OwnerNotFound,
}

/// Journal orchestration service.
///
/// Each operation reads the whole field, manipulates the parsed journal
/// and writes the recomposed text back as a single field update.
pub struct JournalService<J, C>
where
    J: JournalFieldRepository,
    C: Clock + Send + Sync,
{
    fields: Arc<J>,
    clock: Arc<C>,
}

impl<J, C> Clone for JournalService<J, C>
where
    J: JournalFieldRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            fields: Arc::clone(&self.fields),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<J, C> JournalService<J, C>
where
    J: JournalFieldRepository,
    C: Clock + Send + Sync,
{
    /// Creates a journal service over the given field accessor and clock.
    #[must_use]
    pub const fn new(fields: Arc<J>, clock: Arc<C>) -> Self {
        Self { fields, clock }
    }

    /// Prepends an entry to the owner's active section.
    ///
    /// # Errors
    ///
    /// Returns [`JournalServiceError`] when the field accessor fails.
    pub async fn append(
        &self,
        owner: JournalOwner,
        text: &str,
    ) -> JournalServiceResult<AppendOutcome> {
        let Some(current) = self.fields.read(owner).await? else {
            debug!(%owner, "journal append skipped: no live owner");
            return Ok(AppendOutcome::OwnerNotFound);
        };
        let mut journal = Journal::parse(&current);
        let entry_id = journal.append(text, self.clock.as_ref());
        self.fields.write(owner, &journal.compose()).await?;
        Ok(AppendOutcome::Appended { entry_id })
    }

    /// Moves an active entry to the head of the owner's archive.
    ///
    /// # Errors
    ///
    /// Returns [`JournalServiceError`] when the field accessor fails.
    pub async fn archive_entry(
        &self,
        owner: JournalOwner,
        entry_id: &str,
    ) -> JournalServiceResult<EntryMoveOutcome> {
        self.move_entry(owner, entry_id, Journal::archive).await
    }

    /// Moves an archived entry back to the head of the owner's active
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`JournalServiceError`] when the field accessor fails.
    pub async fn restore_entry(
        &self,
        owner: JournalOwner,
        entry_id: &str,
    ) -> JournalServiceResult<EntryMoveOutcome> {
        self.move_entry(owner, entry_id, Journal::restore).await
    }

    /// Returns the presentation view of the owner's journal, or `None`
    /// for a missing or soft-deleted owner.
    ///
    /// # Errors
    ///
    /// Returns [`JournalServiceError`] when the field accessor fails.
    pub async fn entries(
        &self,
        owner: JournalOwner,
    ) -> JournalServiceResult<Option<Vec<JournalEntry>>> {
        let Some(current) = self.fields.read(owner).await? else {
            return Ok(None);
        };
        Ok(Some(Journal::parse(&current).display_entries()))
    }

    async fn move_entry(
        &self,
        owner: JournalOwner,
        entry_id: &str,
        operation: fn(&mut Journal, &str) -> bool,
    ) -> JournalServiceResult<EntryMoveOutcome> {
        let Some(current) = self.fields.read(owner).await? else {
            debug!(%owner, "journal move skipped: no live owner");
            return Ok(EntryMoveOutcome::OwnerNotFound);
        };
        let mut journal = Journal::parse(&current);
        if !operation(&mut journal, entry_id) {
            return Ok(EntryMoveOutcome::EntryNotFound);
        }
        self.fields.write(owner, &journal.compose()).await?;
        Ok(EntryMoveOutcome::Moved)
    }
}
