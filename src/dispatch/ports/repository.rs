//! Repository port for task persistence and atomic queue claims.

use crate::dispatch::domain::{ChannelId, QueueScope, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Every read excludes soft-deleted rows. The three `claim_*` operations
/// carry the load-bearing correctness property of the subsystem: the
/// selection of queued rows and their transition to sent must execute as
/// one atomic unit (row locking, a single-writer transaction, or an
/// equivalent), so that two concurrent claims can never both receive the
/// same task.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task (state, flags, identifiers).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a live task by identifier.
    ///
    /// Returns `None` when the task does not exist or is soft-deleted.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Lists live queued tasks inside the scope, oldest first (queue
    /// timestamp ascending, ties broken by id ascending).
    async fn queued(&self, scope: &QueueScope) -> TaskRepositoryResult<Vec<Task>>;

    /// Atomically claims the oldest live queued task inside the scope for
    /// the given channel, transitioning it to sent.
    ///
    /// Returns `None` when nothing inside the scope is queued.
    async fn claim_next(
        &self,
        scope: &QueueScope,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Atomically claims every live queued task inside the scope for the
    /// given channel, in FIFO order.
    async fn claim_all(
        &self,
        scope: &QueueScope,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Atomically claims one specific task for the given channel.
    ///
    /// Returns `None` when the task is missing, soft-deleted, or not
    /// currently queued. A task a concurrent claim got to first also
    /// yields `None`, which makes the operation an idempotent no-op.
    async fn claim_by_id(
        &self,
        id: TaskId,
        channel: &ChannelId,
    ) -> TaskRepositoryResult<Option<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
