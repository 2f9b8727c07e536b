//! Task aggregate root and the dispatch state machine.

use super::{
    ChannelId, DispatchEvent, MessageRef, ParseDispatchPhaseError, Scope, TaskId, TransitionError,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Position of a task in its delivery lifecycle, without the data each
/// position carries.
///
/// This is the storage and logging representation of [`DispatchState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Not waiting and not assigned to anyone.
    Idle,
    /// Waiting in the FIFO line.
    Queued,
    /// Claimed by an operator channel.
    Sent,
}

impl DispatchPhase {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Sent => "sent",
        }
    }
}

impl TryFrom<&str> for DispatchPhase {
    type Error = ParseDispatchPhaseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "queued" => Ok(Self::Queued),
            "sent" => Ok(Self::Sent),
            _ => Err(ParseDispatchPhaseError(value.to_owned())),
        }
    }
}

impl std::fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch lifecycle state with the data each position carries.
///
/// The shape of the variants encodes the subsystem invariants: a queue
/// timestamp exists exactly while the task is queued or sent, a channel
/// exists only while the task is sent, and the outbound message reference
/// stays empty between the claim and the linking step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DispatchState {
    /// Not waiting and not assigned to anyone.
    Idle,
    /// Waiting in the FIFO line.
    Queued {
        /// Moment the task entered the queue; the FIFO sort key.
        queued_at: DateTime<Utc>,
    },
    /// Claimed by an operator channel.
    Sent {
        /// Moment the task entered the queue before being claimed.
        queued_at: DateTime<Utc>,
        /// Channel the task was claimed for.
        channel: ChannelId,
        /// Outbound message the task is riding on, once linked.
        message: Option<MessageRef>,
    },
}

impl DispatchState {
    /// Returns the lifecycle position without its payload.
    #[must_use]
    pub const fn phase(&self) -> DispatchPhase {
        match self {
            Self::Idle => DispatchPhase::Idle,
            Self::Queued { .. } => DispatchPhase::Queued,
            Self::Sent { .. } => DispatchPhase::Sent,
        }
    }

    /// Returns the queue entry timestamp while queued or sent.
    #[must_use]
    pub const fn queued_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Idle => None,
            Self::Queued { queued_at } | Self::Sent { queued_at, .. } => Some(*queued_at),
        }
    }

    /// Returns the assigned channel while sent.
    #[must_use]
    pub const fn channel(&self) -> Option<&ChannelId> {
        match self {
            Self::Sent { channel, .. } => Some(channel),
            Self::Idle | Self::Queued { .. } => None,
        }
    }

    /// Returns the linked outbound message while sent and linked.
    #[must_use]
    pub const fn message(&self) -> Option<&MessageRef> {
        match self {
            Self::Sent {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Task aggregate root.
///
/// `is_done` and `is_deleted` are orthogonal flags layered on top of the
/// dispatch state: a task can be done without ever having been dispatched,
/// and a deleted task keeps whatever state it had while being excluded
/// from every query in this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    due_date: NaiveDate,
    note: Option<String>,
    scope: Scope,
    dispatch: DispatchState,
    is_done: bool,
    is_deleted: bool,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted due date.
    pub due_date: NaiveDate,
    /// Persisted free-text note, if any.
    pub note: Option<String>,
    /// Persisted parent reference.
    pub scope: Scope,
    /// Persisted dispatch state.
    pub dispatch: DispatchState,
    /// Persisted completion flag.
    pub is_done: bool,
    /// Persisted soft-delete flag.
    pub is_deleted: bool,
}

impl Task {
    /// Creates a fresh idle task.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, due_date: NaiveDate, scope: Scope) -> Self {
        Self {
            id,
            title: title.into(),
            due_date,
            note: None,
            scope,
            dispatch: DispatchState::Idle,
            is_done: false,
            is_deleted: false,
        }
    }

    /// Sets the free-text note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            due_date: data.due_date,
            note: data.note,
            scope: data.scope,
            dispatch: data.dispatch,
            is_done: data.is_done,
            is_deleted: data.is_deleted,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns the free-text note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the parent reference.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the dispatch state.
    #[must_use]
    pub const fn dispatch(&self) -> &DispatchState {
        &self.dispatch
    }

    /// Returns the lifecycle position.
    #[must_use]
    pub const fn phase(&self) -> DispatchPhase {
        self.dispatch.phase()
    }

    /// Returns `true` when the task is completed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.is_done
    }

    /// Returns `true` when the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Places the task into the waiting queue, stamping the FIFO key.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the task is exactly idle.
    pub fn enqueue(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        match self.dispatch {
            DispatchState::Idle => {
                self.dispatch = DispatchState::Queued {
                    queued_at: clock.utc(),
                };
                Ok(())
            }
            _ => Err(self.rejected(DispatchEvent::Enqueue)),
        }
    }

    /// Claims the task for delivery on the given channel.
    ///
    /// The queue timestamp is kept; the outbound message reference stays
    /// empty until the linking step records it.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the task is exactly queued.
    pub fn begin_delivery(&mut self, channel: ChannelId) -> Result<(), TransitionError> {
        match self.dispatch {
            DispatchState::Queued { queued_at } => {
                self.dispatch = DispatchState::Sent {
                    queued_at,
                    channel,
                    message: None,
                };
                Ok(())
            }
            _ => Err(self.rejected(DispatchEvent::BeginDelivery)),
        }
    }

    /// Records the outbound message the task is riding on.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the task is currently sent.
    pub fn link_message(
        &mut self,
        channel: ChannelId,
        message: MessageRef,
    ) -> Result<(), TransitionError> {
        match self.dispatch {
            DispatchState::Sent { queued_at, .. } => {
                self.dispatch = DispatchState::Sent {
                    queued_at,
                    channel,
                    message: Some(message),
                };
                Ok(())
            }
            _ => Err(self.rejected(DispatchEvent::LinkMessage)),
        }
    }

    /// Sends the task to the back of the waiting queue.
    ///
    /// The queue timestamp is re-stamped to now, so the task loses its
    /// original position in the FIFO line; the channel and message
    /// identifiers are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the task is currently sent.
    pub fn return_to_queue(&mut self, clock: &impl Clock) -> Result<(), TransitionError> {
        match self.dispatch {
            DispatchState::Sent { .. } => {
                self.dispatch = DispatchState::Queued {
                    queued_at: clock.utc(),
                };
                Ok(())
            }
            _ => Err(self.rejected(DispatchEvent::ReturnToQueue)),
        }
    }

    /// Detaches the task from its operator channel.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the task is queued; unassigning an
    /// idle task is a permitted no-op.
    pub fn unassign(&mut self) -> Result<(), TransitionError> {
        match self.dispatch {
            DispatchState::Sent { .. } | DispatchState::Idle => {
                self.dispatch = DispatchState::Idle;
                Ok(())
            }
            DispatchState::Queued { .. } => Err(self.rejected(DispatchEvent::Unassign)),
        }
    }

    /// Completes the task.
    ///
    /// Forces the dispatch state back to idle from any position and drops
    /// the channel and message identifiers; journalling the completion is
    /// the notifier's concern.
    pub fn mark_done(&mut self) {
        self.is_done = true;
        self.dispatch = DispatchState::Idle;
    }

    /// Soft-deletes the task, leaving the dispatch state untouched.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    const fn rejected(&self, event: DispatchEvent) -> TransitionError {
        TransitionError {
            id: self.id,
            event,
            phase: self.dispatch.phase(),
        }
    }
}
