//! Append-only journal embedded in a parent CRM record.
//!
//! A deal or policy record owns a single text field holding the journal:
//! an active section, optionally followed by a fixed archive marker and an
//! archived section. Entries are never deleted, only moved between the
//! sections; order within a section is controlled entirely by where new
//! text is spliced in. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
