//! Port contracts for task dispatch.
//!
//! Ports define infrastructure-agnostic interfaces used by the dispatch
//! services: task persistence with atomic claim semantics, soft-delete
//! aware parent lookup against the CRM store, and the outbound
//! notification gateway.

pub mod directory;
pub mod gateway;
pub mod repository;

pub use directory::{CrmDirectory, DirectoryError, DirectoryResult};
pub use gateway::{GatewayError, GatewayResult, MessageControls, NotificationGateway};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
