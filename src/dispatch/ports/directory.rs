//! Directory port for soft-delete aware parent lookup in the CRM store.

use crate::dispatch::domain::{
    ClientId, ClientSummary, DealId, DealSummary, PolicyId, PolicySummary,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read-only lookup of the CRM records tasks are scoped to.
///
/// The relational store owns these records; the dispatch subsystem only
/// consumes summaries. Lookups return `None` for soft-deleted records and
/// listings exclude them, so a dead client, deal or policy never
/// contributes to a scope.
#[async_trait]
pub trait CrmDirectory: Send + Sync {
    /// Resolves a live client by identifier.
    async fn client(&self, id: ClientId) -> DirectoryResult<Option<ClientSummary>>;

    /// Resolves a live deal by identifier.
    async fn deal(&self, id: DealId) -> DirectoryResult<Option<DealSummary>>;

    /// Resolves a live policy by identifier.
    async fn policy(&self, id: PolicyId) -> DirectoryResult<Option<PolicySummary>>;

    /// Lists the live deals of a client.
    async fn deals_of_client(&self, id: ClientId) -> DirectoryResult<Vec<DealSummary>>;

    /// Lists the live policies of a client, whether or not they were
    /// issued under a deal.
    async fn policies_of_client(&self, id: ClientId) -> DirectoryResult<Vec<PolicySummary>>;

    /// Lists the live policies issued under a deal.
    async fn policies_of_deal(&self, id: DealId) -> DirectoryResult<Vec<PolicySummary>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
