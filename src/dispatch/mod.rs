//! Task dispatch for the agency CRM.
//!
//! A task is created against a deal or policy, enqueued, claimed by an
//! operator channel through one of the atomic pop operations, delivered
//! over the notification gateway, and finalised with a journal entry on
//! the parent record. The module enforces the two load-bearing guarantees
//! of the subsystem: FIFO ordering by enqueue time within a pop call, and
//! at most one concurrent dispatch per task. The module follows hexagonal
//! architecture:
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
