//! In-memory CRM directory seeded by tests and demos.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::dispatch::{
    domain::{ClientId, ClientSummary, DealId, DealSummary, PolicyId, PolicySummary},
    ports::{CrmDirectory, DirectoryError, DirectoryResult},
};

/// Thread-safe in-memory stand-in for the CRM's client/deal/policy tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    clients: BTreeMap<ClientId, ClientSummary>,
    deals: BTreeMap<DealId, DealSummary>,
    policies: BTreeMap<PolicyId, PolicySummary>,
}

fn lock_poisoned<E: std::fmt::Display>(err: E) -> DirectoryError {
    DirectoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a client record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the backing lock is poisoned.
    pub fn upsert_client(&self, client: ClientSummary) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.clients.insert(client.id, client);
        Ok(())
    }

    /// Inserts or replaces a deal record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the backing lock is poisoned.
    pub fn upsert_deal(&self, deal: DealSummary) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.deals.insert(deal.id, deal);
        Ok(())
    }

    /// Inserts or replaces a policy record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the backing lock is poisoned.
    pub fn upsert_policy(&self, policy: PolicySummary) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.policies.insert(policy.id, policy);
        Ok(())
    }
}

#[async_trait]
impl CrmDirectory for InMemoryDirectory {
    async fn client(&self, id: ClientId) -> DirectoryResult<Option<ClientSummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .clients
            .get(&id)
            .filter(|client| !client.is_deleted)
            .cloned())
    }

    async fn deal(&self, id: DealId) -> DirectoryResult<Option<DealSummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.deals.get(&id).filter(|deal| !deal.is_deleted).cloned())
    }

    async fn policy(&self, id: PolicyId) -> DirectoryResult<Option<PolicySummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .policies
            .get(&id)
            .filter(|policy| !policy.is_deleted)
            .cloned())
    }

    async fn deals_of_client(&self, id: ClientId) -> DirectoryResult<Vec<DealSummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .deals
            .values()
            .filter(|deal| deal.client_id == id && !deal.is_deleted)
            .cloned()
            .collect())
    }

    async fn policies_of_client(&self, id: ClientId) -> DirectoryResult<Vec<PolicySummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .policies
            .values()
            .filter(|policy| policy.client_id == id && !policy.is_deleted)
            .cloned()
            .collect())
    }

    async fn policies_of_deal(&self, id: DealId) -> DirectoryResult<Vec<PolicySummary>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .policies
            .values()
            .filter(|policy| policy.deal_id == Some(id) && !policy.is_deleted)
            .cloned()
            .collect())
    }
}
