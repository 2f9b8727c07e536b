//! Courtier: task dispatch core for an insurance-agency CRM.
//!
//! This crate implements the one subsystem of the agency CRM that has to
//! reason about concurrent access to shared mutable state: the queue that
//! hands work items ("tasks" tied to a deal or policy) to human operators
//! over a chat channel, guarantees each item is in flight with at most one
//! operator at a time, and on completion appends a record to the parent
//! record's append-only journal.
//!
//! # Architecture
//!
//! Courtier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (storage, gateways)
//!
//! The relational schema for clients, deals, policies and payments, the GUI
//! forms and the concrete chat protocol live outside this crate; they plug
//! in through the port traits.
//!
//! # Modules
//!
//! - [`dispatch`]: Task state machine, scoped FIFO queue and notifier
//! - [`journal`]: Append-only content-hashed journal on a parent record

// Mocks generated for the test harness carry no doc comments.
#![cfg_attr(test, allow(missing_docs))]

pub mod dispatch;
pub mod journal;
