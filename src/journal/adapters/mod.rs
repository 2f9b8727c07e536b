//! Adapter implementations of the journal ports.

pub mod memory;

pub use memory::InMemoryJournalField;
