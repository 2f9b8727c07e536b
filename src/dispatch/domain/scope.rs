//! Task scope: the deal or policy a task is attached to, and the
//! pre-resolved filters the queue claims against.

use super::{DealId, PolicyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parent reference of a task.
///
/// A task is attached to exactly one deal, exactly one policy, or nothing
/// at all. A policy-scoped task is indirectly scoped to the policy's deal
/// and client; resolution of those indirect paths lives in the scope
/// resolver service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scope {
    /// The task belongs directly to a deal.
    Deal {
        /// Parent deal.
        id: DealId,
    },
    /// The task belongs to a policy (and through it, possibly to a deal).
    Policy {
        /// Parent policy.
        id: PolicyId,
    },
    /// The task has no parent record.
    Unscoped,
}

impl Scope {
    /// Returns the deal the task is directly attached to, if any.
    #[must_use]
    pub const fn deal_id(self) -> Option<DealId> {
        match self {
            Self::Deal { id } => Some(id),
            Self::Policy { .. } | Self::Unscoped => None,
        }
    }

    /// Returns the policy the task is directly attached to, if any.
    #[must_use]
    pub const fn policy_id(self) -> Option<PolicyId> {
        match self {
            Self::Policy { id } => Some(id),
            Self::Deal { .. } | Self::Unscoped => None,
        }
    }

    /// Returns `true` when the task has no parent record.
    #[must_use]
    pub const fn is_unscoped(self) -> bool {
        matches!(self, Self::Unscoped)
    }
}

/// Pre-resolved filter a pop operation claims against.
///
/// Built by the scope resolver from live CRM relationships so that the
/// task store can evaluate membership without further lookups inside its
/// claim transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueScope {
    /// Every queued task, regardless of parent.
    Global,
    /// Tasks attached to any of the listed deals or policies.
    Linked {
        /// Deals whose directly-attached tasks are in scope.
        deals: BTreeSet<DealId>,
        /// Policies whose directly-attached tasks are in scope.
        policies: BTreeSet<PolicyId>,
    },
}

impl QueueScope {
    /// Builds a linked filter from resolved deal and policy sets.
    #[must_use]
    pub fn linked(
        deals: impl IntoIterator<Item = DealId>,
        policies: impl IntoIterator<Item = PolicyId>,
    ) -> Self {
        Self::Linked {
            deals: deals.into_iter().collect(),
            policies: policies.into_iter().collect(),
        }
    }

    /// Returns `true` when a task with the given parent reference falls
    /// inside this filter.
    ///
    /// Unscoped tasks are reachable only through the global filter.
    #[must_use]
    pub fn matches(&self, scope: Scope) -> bool {
        match self {
            Self::Global => true,
            Self::Linked { deals, policies } => match scope {
                Scope::Deal { id } => deals.contains(&id),
                Scope::Policy { id } => policies.contains(&id),
                Scope::Unscoped => false,
            },
        }
    }
}
