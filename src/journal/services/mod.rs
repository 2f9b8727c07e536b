//! Application services for the journal.

mod journal;

pub use journal::{
    AppendOutcome, EntryMoveOutcome, JournalService, JournalServiceError, JournalServiceResult,
};
