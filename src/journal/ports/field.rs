//! Field port: get/set the single journal text field on a parent record.

use crate::dispatch::domain::{DealId, PolicyId, Scope};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for journal field operations.
pub type JournalFieldResult<T> = Result<T, JournalFieldError>;

/// The parent record a journal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalOwner {
    /// The journal lives on a deal record.
    Deal {
        /// Owning deal.
        id: DealId,
    },
    /// The journal lives on a policy record.
    Policy {
        /// Owning policy.
        id: PolicyId,
    },
}

impl JournalOwner {
    /// Maps a task's parent reference to the journal owner, when it has
    /// one.
    #[must_use]
    pub const fn from_scope(scope: Scope) -> Option<Self> {
        match scope {
            Scope::Deal { id } => Some(Self::Deal { id }),
            Scope::Policy { id } => Some(Self::Policy { id }),
            Scope::Unscoped => None,
        }
    }
}

impl fmt::Display for JournalOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deal { id } => write!(f, "deal {id}"),
            Self::Policy { id } => write!(f, "policy {id}"),
        }
    }
}

/// Accessor for the journal text field on a deal or policy record.
///
/// Implementations run the write inside the same transaction scope as the
/// surrounding task mutation wherever the backing store supports it.
#[async_trait]
pub trait JournalFieldRepository: Send + Sync {
    /// Reads the journal text of a live owner.
    ///
    /// Returns `None` when the owner is missing or soft-deleted; an owner
    /// without journal text yields an empty string.
    async fn read(&self, owner: JournalOwner) -> JournalFieldResult<Option<String>>;

    /// Replaces the journal text of a live owner as one field update.
    ///
    /// # Errors
    ///
    /// Returns [`JournalFieldError::UnknownOwner`] when the owner is
    /// missing or soft-deleted.
    async fn write(&self, owner: JournalOwner, text: &str) -> JournalFieldResult<()>;
}

/// Errors returned by journal field implementations.
#[derive(Debug, Clone, Error)]
pub enum JournalFieldError {
    /// The parent record is missing or soft-deleted.
    #[error("unknown journal owner: {0}")]
    UnknownOwner(JournalOwner),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JournalFieldError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
