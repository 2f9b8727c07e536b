//! The dispatch queue: enqueueing, atomic scoped pops and listings.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::domain::{
    ChannelId, ClientId, ClientSummary, DealId, DealSummary, DispatchPhase, MessageRef,
    PolicySummary, QueueScope, Task, TaskId,
};
use crate::dispatch::ports::{CrmDirectory, DirectoryError, TaskRepository, TaskRepositoryError};
use crate::dispatch::services::scope::ScopeResolver;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors surfaced by queue operations.
///
/// Domain-expected conditions (no match, guard rejection) never appear
/// here; they resolve to empty results and [`TransitionOutcome`] values.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Task persistence failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Parent lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result of applying a lifecycle event through the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The event was applied and persisted.
    Applied,
    /// The state machine rejected the event; nothing changed. Carries the
    /// phase the task was in when the event arrived.
    Rejected(DispatchPhase),
    /// No live task with the given identifier; nothing changed.
    NotFound,
}

impl TransitionOutcome {
    /// Returns `true` when the event was applied.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A claimed task together with the display data its parents provide.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedTask {
    /// The claimed task, already transitioned to sent.
    pub task: Task,
    /// The parent deal, directly or through the policy.
    pub deal: Option<DealSummary>,
    /// The parent policy, if the task is policy-scoped.
    pub policy: Option<PolicySummary>,
    /// The client at the top of the parent chain.
    pub client: Option<ClientSummary>,
}

/// The task dispatch queue.
///
/// Every operation runs to completion against the shared store; FIFO
/// ordering is guaranteed within a single pop call, and the claim
/// operations of the underlying repository guarantee at most one
/// concurrent dispatch per task.
pub struct DispatchQueue<R, D, C>
where
    R: TaskRepository,
    D: CrmDirectory,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    resolver: ScopeResolver<D>,
    clock: Arc<C>,
}

impl<R, D, C> Clone for DispatchQueue<R, D, C>
where
    R: TaskRepository,
    D: CrmDirectory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            resolver: self.resolver.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, D, C> DispatchQueue<R, D, C>
where
    R: TaskRepository,
    D: CrmDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a queue over the given store, directory and clock.
    #[must_use]
    pub fn new(tasks: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            resolver: ScopeResolver::new(directory),
            clock,
        }
    }

    /// Returns the scope resolver the queue operates with.
    #[must_use]
    pub const fn resolver(&self) -> &ScopeResolver<D> {
        &self.resolver
    }

    /// Places a task into the waiting queue.
    ///
    /// A task that is not exactly idle is left untouched and the rejection
    /// is reported (and logged) instead of raised, so a duplicate click
    /// cannot fail the user's action.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store fails.
    pub async fn enqueue(&self, task_id: TaskId) -> QueueResult<TransitionOutcome> {
        self.apply(task_id, |task, clock| task.enqueue(clock)).await
    }

    /// Sends a task to the back of the waiting queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store fails.
    pub async fn return_to_queue(&self, task_id: TaskId) -> QueueResult<TransitionOutcome> {
        self.apply(task_id, |task, clock| task.return_to_queue(clock))
            .await
    }

    /// Records the outbound message a sent task is riding on.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store fails.
    pub async fn link_message(
        &self,
        task_id: TaskId,
        channel: ChannelId,
        message: MessageRef,
    ) -> QueueResult<TransitionOutcome> {
        self.apply(task_id, move |task, _clock| {
            task.link_message(channel, message)
        })
        .await
    }

    /// Detaches a task from its operator channel.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store fails.
    pub async fn unassign(&self, task_id: TaskId) -> QueueResult<TransitionOutcome> {
        self.apply(task_id, |task, _clock| task.unassign()).await
    }

    /// Claims the oldest queued task, regardless of scope.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn pop_next(&self, channel: &ChannelId) -> QueueResult<Option<DispatchedTask>> {
        let claimed = self.tasks.claim_next(&QueueScope::Global, channel).await?;
        self.decorate_opt(claimed).await
    }

    /// Claims the oldest queued task belonging to a client, through any of
    /// the deal and policy paths.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn pop_next_by_client(
        &self,
        channel: &ChannelId,
        client_id: ClientId,
    ) -> QueueResult<Option<DispatchedTask>> {
        let Some(scope) = self.resolver.client_scope(client_id).await? else {
            debug!(client = %client_id, "pop skipped: no live client");
            return Ok(None);
        };
        let claimed = self.tasks.claim_next(&scope, channel).await?;
        self.decorate_opt(claimed).await
    }

    /// Claims the oldest queued task belonging to a deal, directly or
    /// through one of the deal's policies.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn pop_next_by_deal(
        &self,
        channel: &ChannelId,
        deal_id: DealId,
    ) -> QueueResult<Option<DispatchedTask>> {
        let Some(scope) = self.resolver.deal_scope(deal_id).await? else {
            debug!(deal = %deal_id, "pop skipped: no live deal");
            return Ok(None);
        };
        let claimed = self.tasks.claim_next(&scope, channel).await?;
        self.decorate_opt(claimed).await
    }

    /// Drains every queued task belonging to a deal, in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn pop_all_by_deal(
        &self,
        channel: &ChannelId,
        deal_id: DealId,
    ) -> QueueResult<Vec<DispatchedTask>> {
        let Some(scope) = self.resolver.deal_scope(deal_id).await? else {
            debug!(deal = %deal_id, "pop skipped: no live deal");
            return Ok(Vec::new());
        };
        let claimed = self.tasks.claim_all(&scope, channel).await?;
        let mut dispatched = Vec::with_capacity(claimed.len());
        for task in claimed {
            dispatched.push(self.decorate(task).await?);
        }
        Ok(dispatched)
    }

    /// Claims one specific task, if it is still queued.
    ///
    /// A task somebody else already claimed yields `None` rather than an
    /// error, making the operation an idempotent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn pop_task_by_id(
        &self,
        channel: &ChannelId,
        task_id: TaskId,
    ) -> QueueResult<Option<DispatchedTask>> {
        let claimed = self.tasks.claim_by_id(task_id, channel).await?;
        self.decorate_opt(claimed).await
    }

    /// Lists the clients that currently have queued tasks, deduplicated
    /// and sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn list_clients_with_queued_tasks(&self) -> QueueResult<Vec<ClientSummary>> {
        let queued = self.tasks.queued(&QueueScope::Global).await?;
        let mut clients = BTreeMap::new();
        for task in &queued {
            let parents = self.resolver.parents_of(task.scope()).await?;
            if let Some(client) = parents.client {
                clients.entry(client.id).or_insert(client);
            }
        }
        Ok(clients.into_values().collect())
    }

    /// Lists the deals that currently have queued tasks, deduplicated and
    /// sorted by id, optionally restricted to one client.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the store or a parent lookup fails.
    pub async fn list_deals_with_queued_tasks(
        &self,
        client_id: Option<ClientId>,
    ) -> QueueResult<Vec<DealSummary>> {
        let queued = self.tasks.queued(&QueueScope::Global).await?;
        let mut deals = BTreeMap::new();
        for task in &queued {
            let parents = self.resolver.parents_of(task.scope()).await?;
            if let Some(deal) = parents.deal {
                if client_id.is_none_or(|id| deal.client_id == id) {
                    deals.entry(deal.id).or_insert(deal);
                }
            }
        }
        Ok(deals.into_values().collect())
    }

    /// Loads a task, applies one lifecycle event and persists the result,
    /// translating guard rejections into logged no-op outcomes.
    async fn apply<F>(&self, task_id: TaskId, event: F) -> QueueResult<TransitionOutcome>
    where
        F: FnOnce(&mut Task, &C) -> Result<(), crate::dispatch::domain::TransitionError> + Send,
    {
        let Some(mut task) = self.tasks.find_by_id(task_id).await? else {
            debug!(task = %task_id, "transition skipped: no live task");
            return Ok(TransitionOutcome::NotFound);
        };
        match event(&mut task, self.clock.as_ref()) {
            Ok(()) => {
                self.tasks.update(&task).await?;
                Ok(TransitionOutcome::Applied)
            }
            Err(err) => {
                warn!(task = %task_id, %err, "transition rejected");
                Ok(TransitionOutcome::Rejected(task.phase()))
            }
        }
    }

    async fn decorate(&self, task: Task) -> QueueResult<DispatchedTask> {
        let parents = self.resolver.parents_of(task.scope()).await?;
        Ok(DispatchedTask {
            task,
            deal: parents.deal,
            policy: parents.policy,
            client: parents.client,
        })
    }

    async fn decorate_opt(&self, task: Option<Task>) -> QueueResult<Option<DispatchedTask>> {
        match task {
            Some(task) => Ok(Some(self.decorate(task).await?)),
            None => Ok(None),
        }
    }
}
