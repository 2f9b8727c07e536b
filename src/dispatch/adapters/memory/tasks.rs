//! In-memory task store with single-writer claim transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::dispatch::{
    domain::{ChannelId, DispatchPhase, QueueScope, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Each claim operation selects and mutates under one write-lock
/// acquisition, which is the in-memory rendition of the row-locked
/// transaction the relational store would use: two concurrent claims are
/// serialized against each other and can never both receive the same row.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<BTreeMap<TaskId, Task>>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory task store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<E: std::fmt::Display>(err: E) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Returns `true` when the task is eligible for a claim inside the scope.
fn is_claimable(task: &Task, scope: &QueueScope) -> bool {
    !task.is_deleted() && task.phase() == DispatchPhase::Queued && scope.matches(task.scope())
}

/// FIFO sort key: queue timestamp ascending, ties broken by id ascending.
fn fifo_key(task: &Task) -> (Option<DateTime<Utc>>, TaskId) {
    (task.dispatch().queued_at(), task.id())
}

/// Ids of the claimable tasks inside the scope, in FIFO order.
fn claimable_ids(tasks: &BTreeMap<TaskId, Task>, scope: &QueueScope) -> Vec<TaskId> {
    let mut eligible: Vec<&Task> = tasks
        .values()
        .filter(|task| is_claimable(task, scope))
        .collect();
    eligible.sort_by_key(|task| fifo_key(task));
    eligible.iter().map(|task| task.id()).collect()
}

/// Transitions one queued task to sent inside the open transaction.
fn claim_in_place(
    tasks: &mut BTreeMap<TaskId, Task>,
    id: TaskId,
    channel: &ChannelId,
) -> TaskRepositoryResult<Option<Task>> {
    let Some(task) = tasks.get_mut(&id) else {
        return Ok(None);
    };
    task.begin_delivery(channel.clone())
        .map_err(TaskRepositoryError::persistence)?;
    Ok(Some(task.clone()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_poisoned)?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_poisoned)?;
        if !tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.state.read().map_err(lock_poisoned)?;
        Ok(tasks.get(&id).filter(|task| !task.is_deleted()).cloned())
    }

    async fn queued(&self, scope: &QueueScope) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_poisoned)?;
        let ids = claimable_ids(&tasks, scope);
        Ok(ids
            .iter()
            .filter_map(|id| tasks.get(id).cloned())
            .collect())
    }

    async fn claim_next(
        &self,
        scope: &QueueScope,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut tasks = self.state.write().map_err(lock_poisoned)?;
        let Some(id) = claimable_ids(&tasks, scope).into_iter().next() else {
            return Ok(None);
        };
        claim_in_place(&mut tasks, id, channel)
    }

    async fn claim_all(
        &self,
        scope: &QueueScope,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks = self.state.write().map_err(lock_poisoned)?;
        let ids = claimable_ids(&tasks, scope);
        let mut claimed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(task) = claim_in_place(&mut tasks, id, channel)? {
                claimed.push(task);
            }
        }
        Ok(claimed)
    }

    async fn claim_by_id(
        &self,
        id: TaskId,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let mut tasks = self.state.write().map_err(lock_poisoned)?;
        let eligible = tasks
            .get(&id)
            .is_some_and(|task| is_claimable(task, &QueueScope::Global));
        if !eligible {
            return Ok(None);
        }
        claim_in_place(&mut tasks, id, channel)
    }
}
