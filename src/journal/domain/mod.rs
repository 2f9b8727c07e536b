//! Domain model for the embedded journal.
//!
//! Parsing and composition are lossless: an entry keeps the exact text
//! span it was parsed from, and recomposing an unmodified journal
//! reproduces the original field byte for byte.

mod entry;
mod log;

pub use entry::{is_entry_header, JournalEntry, HEADER_TIME_FORMAT};
pub use log::{Journal, ARCHIVE_MARKER};
