//! Error types for dispatch domain validation and parsing.

use super::task::DispatchPhase;
use super::TaskId;
use std::fmt;
use thiserror::Error;

/// Lifecycle events a caller can ask the state machine to apply.
///
/// Used in rejection diagnostics; the actual transitions are methods on
/// [`super::Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Place the task into the waiting queue.
    Enqueue,
    /// Claim the task for delivery on an operator channel.
    BeginDelivery,
    /// Record the outbound message the task is riding on.
    LinkMessage,
    /// Send the task to the back of the waiting queue.
    ReturnToQueue,
    /// Detach the task from its operator channel.
    Unassign,
}

impl DispatchEvent {
    /// Returns the event name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enqueue => "enqueue",
            Self::BeginDelivery => "begin delivery of",
            Self::LinkMessage => "link a message to",
            Self::ReturnToQueue => "return to queue",
            Self::Unassign => "unassign",
        }
    }
}

impl fmt::Display for DispatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guard violation reported by a task transition method.
///
/// Services treat this as a best-effort no-op (logged, state untouched)
/// rather than a hard failure, so duplicate UI clicks and stale bot
/// callbacks cannot fail a user action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot {event} task {id}: task is {phase}")]
pub struct TransitionError {
    /// Task the event was applied to.
    pub id: TaskId,
    /// Event that was rejected.
    pub event: DispatchEvent,
    /// Phase the task was in when the event arrived.
    pub phase: DispatchPhase,
}

/// Error returned while parsing dispatch phases from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown dispatch phase: {0}")]
pub struct ParseDispatchPhaseError(pub String);
