//! Port contracts for journal storage.

pub mod field;

pub use field::{JournalFieldError, JournalFieldRepository, JournalFieldResult, JournalOwner};
