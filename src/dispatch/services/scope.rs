//! Scope resolution: which deals and policies a queue query reaches.
//!
//! A task can be reached by a client or deal query in three ways: through
//! its own deal link, through a policy issued under the deal, or
//! transitively through a policy's deal up to the client. Every query must
//! union all matching paths; omitting one silently under-delivers tasks
//! whose only link is a policy. This service centralizes that resolution
//! so the queue and the listings cannot drift apart.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::dispatch::domain::{
    ClientId, ClientSummary, DealId, DealSummary, PolicySummary, QueueScope, Scope,
};
use crate::dispatch::ports::{CrmDirectory, DirectoryError};

/// Result type for scope resolution.
pub type ScopeResult<T> = Result<T, DirectoryError>;

/// Live parent records of a task, resolved through its scope.
///
/// Fields stay `None` wherever the chain is broken by a missing or
/// soft-deleted record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskParents {
    /// The deal the task belongs to, directly or through its policy.
    pub deal: Option<DealSummary>,
    /// The policy the task belongs to.
    pub policy: Option<PolicySummary>,
    /// The client at the top of the chain.
    pub client: Option<ClientSummary>,
}

/// Resolves CRM relationships into claim filters and parent chains.
pub struct ScopeResolver<D: CrmDirectory> {
    directory: Arc<D>,
}

impl<D: CrmDirectory> Clone for ScopeResolver<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: CrmDirectory> ScopeResolver<D> {
    /// Creates a resolver over the given directory.
    #[must_use]
    pub const fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Builds the claim filter for everything belonging to a client.
    ///
    /// Unions the client's deals, the client's directly-held policies and
    /// the policies issued under each deal. Returns `None` when the client
    /// is missing or soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when a lookup fails.
    pub async fn client_scope(&self, id: ClientId) -> ScopeResult<Option<QueueScope>> {
        if self.directory.client(id).await?.is_none() {
            return Ok(None);
        }
        let deals = self.directory.deals_of_client(id).await?;
        let mut policies: BTreeSet<_> = self
            .directory
            .policies_of_client(id)
            .await?
            .iter()
            .map(|policy| policy.id)
            .collect();
        for deal in &deals {
            for policy in self.directory.policies_of_deal(deal.id).await? {
                policies.insert(policy.id);
            }
        }
        Ok(Some(QueueScope::linked(
            deals.iter().map(|deal| deal.id),
            policies,
        )))
    }

    /// Builds the claim filter for everything belonging to a deal: the
    /// deal itself plus the policies issued under it.
    ///
    /// Returns `None` when the deal is missing or soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when a lookup fails.
    pub async fn deal_scope(&self, id: DealId) -> ScopeResult<Option<QueueScope>> {
        if self.directory.deal(id).await?.is_none() {
            return Ok(None);
        }
        let policies = self.directory.policies_of_deal(id).await?;
        Ok(Some(QueueScope::linked(
            [id],
            policies.iter().map(|policy| policy.id),
        )))
    }

    /// Resolves the live parent chain of a task's scope.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when a lookup fails.
    pub async fn parents_of(&self, scope: Scope) -> ScopeResult<TaskParents> {
        match scope {
            Scope::Deal { id } => {
                let Some(deal) = self.directory.deal(id).await? else {
                    return Ok(TaskParents::default());
                };
                let client = self.directory.client(deal.client_id).await?;
                Ok(TaskParents {
                    deal: Some(deal),
                    policy: None,
                    client,
                })
            }
            Scope::Policy { id } => {
                let Some(policy) = self.directory.policy(id).await? else {
                    return Ok(TaskParents::default());
                };
                let deal = match policy.deal_id {
                    Some(deal_id) => self.directory.deal(deal_id).await?,
                    None => None,
                };
                let client = self.directory.client(policy.client_id).await?;
                Ok(TaskParents {
                    deal,
                    policy: Some(policy),
                    client,
                })
            }
            Scope::Unscoped => Ok(TaskParents::default()),
        }
    }
}
