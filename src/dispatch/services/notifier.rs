//! The task notifier: re-engaging tasks and finalising completions.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dispatch::domain::{ChannelId, DispatchState, Task, TaskId};
use crate::dispatch::ports::{
    CrmDirectory, GatewayError, MessageControls, NotificationGateway, TaskRepository,
    TaskRepositoryError,
};
use crate::dispatch::services::queue::{DispatchQueue, QueueError, TransitionOutcome};
use crate::journal::domain::HEADER_TIME_FORMAT;
use crate::journal::ports::{JournalFieldRepository, JournalOwner};
use crate::journal::services::{AppendOutcome, JournalService, JournalServiceError};

/// Phrase journalled for a completion when neither the caller nor the
/// task carries a note.
const DEFAULT_COMPLETION_NOTE: &str = "Задача выполнена";

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Infrastructure errors surfaced by notifier operations.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Task persistence failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// A queue operation failed.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// A journal operation failed.
    #[error(transparent)]
    Journal(#[from] JournalServiceError),
}

/// What `notify` did with the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    /// The task card was re-sent to the attached channel.
    Resent,
    /// The delivery had dropped between claim and link; the task went
    /// back to the queue.
    Requeued,
    /// The idle task entered the queue.
    Enqueued,
    /// The task was already waiting; nothing to do.
    AlreadyQueued,
    /// No live task with the given identifier.
    NotFound,
}

/// Whether an outbound message reached the gateway.
///
/// A failure never rolls back the state transition that preceded it; it
/// is reported here for callers that want to react.
#[derive(Debug, Clone)]
pub enum DeliveryStatus {
    /// The gateway accepted the message.
    Delivered,
    /// The gateway failed; the carried error says why.
    Failed(GatewayError),
    /// No message needed to be sent.
    Skipped,
}

/// Receipt of a `notify` call.
#[derive(Debug, Clone)]
pub struct NotifyReceipt {
    /// What happened to the task's state.
    pub action: NotifyAction,
    /// What happened on the wire.
    pub delivery: DeliveryStatus,
}

/// Whether a completion produced a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalWrite {
    /// An entry was spliced at the head of the parent's journal.
    Appended {
        /// The parent record written to.
        owner: JournalOwner,
        /// Content identifier of the new entry.
        entry_id: String,
    },
    /// The task has no live parent record; no journal write occurred.
    NoParent,
}

/// Receipt of a `mark_done` call.
#[derive(Debug, Clone)]
pub enum CompletionReceipt {
    /// The task was finalised.
    Completed {
        /// Journal side effect on the parent record.
        journal: JournalWrite,
        /// Delivery of the completion announcement to the administrator.
        admin_notice: DeliveryStatus,
    },
    /// No live task with the given identifier; nothing changed.
    NotFound,
}

/// Decides, per task, whether to re-send, return to queue or enqueue, and
/// writes completion side effects into the parent's journal.
pub struct TaskNotifier<R, D, G, J, C>
where
    R: TaskRepository,
    D: CrmDirectory,
    G: NotificationGateway,
    J: JournalFieldRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    queue: DispatchQueue<R, D, C>,
    gateway: Arc<G>,
    journal: JournalService<J, C>,
    clock: Arc<C>,
}

impl<R, D, G, J, C> TaskNotifier<R, D, G, J, C>
where
    R: TaskRepository,
    D: CrmDirectory,
    G: NotificationGateway,
    J: JournalFieldRepository,
    C: Clock + Send + Sync,
{
    /// Creates a notifier over the queue and its collaborators.
    #[must_use]
    pub const fn new(
        tasks: Arc<R>,
        queue: DispatchQueue<R, D, C>,
        gateway: Arc<G>,
        journal: JournalService<J, C>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            queue,
            gateway,
            journal,
            clock,
        }
    }

    /// Re-engages a task a human asked to be reminded about.
    ///
    /// A sent task with a linked message gets its card re-sent to the
    /// attached channel (idempotent for the state machine); a sent task
    /// whose outbound message never got linked is treated as a dropped
    /// delivery and returned to the queue; an idle task is enqueued; a
    /// queued task is already waiting and is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the store fails. Gateway failures
    /// are reported in the receipt, never raised.
    pub async fn notify(&self, task_id: TaskId) -> NotifierResult<NotifyReceipt> {
        let Some(task) = self.tasks.find_by_id(task_id).await? else {
            debug!(task = %task_id, "notify skipped: no live task");
            return Ok(NotifyReceipt {
                action: NotifyAction::NotFound,
                delivery: DeliveryStatus::Skipped,
            });
        };
        match task.dispatch().clone() {
            DispatchState::Sent {
                channel,
                message: Some(_),
                ..
            } => self.resend(task, channel).await,
            DispatchState::Sent { message: None, .. } => {
                let outcome = self.queue.return_to_queue(task_id).await?;
                Ok(NotifyReceipt {
                    action: action_from_outcome(outcome, NotifyAction::Requeued),
                    delivery: DeliveryStatus::Skipped,
                })
            }
            DispatchState::Idle => {
                let outcome = self.queue.enqueue(task_id).await?;
                Ok(NotifyReceipt {
                    action: action_from_outcome(outcome, NotifyAction::Enqueued),
                    delivery: DeliveryStatus::Skipped,
                })
            }
            DispatchState::Queued { .. } => Ok(NotifyReceipt {
                action: NotifyAction::AlreadyQueued,
                delivery: DeliveryStatus::Skipped,
            }),
        }
    }

    /// Completes a task and journals the completion on its parent.
    ///
    /// The state machine is forced to idle from any position; the journal
    /// entry's body is the supplied note, else the task's stored note,
    /// else a fixed default phrase. The administrator is informed
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the store or the journal accessor
    /// fails. Gateway failures are reported in the receipt, never raised.
    pub async fn mark_done(
        &self,
        task_id: TaskId,
        note: Option<&str>,
    ) -> NotifierResult<CompletionReceipt> {
        let Some(mut task) = self.tasks.find_by_id(task_id).await? else {
            debug!(task = %task_id, "mark done skipped: no live task");
            return Ok(CompletionReceipt::NotFound);
        };
        task.mark_done();
        self.tasks.update(&task).await?;

        let journal = self.journal_completion(&task, note).await?;
        let admin_text = format!("Задача №{} закрыта: {}", task.id(), task.title());
        let admin_notice = match self.gateway.notify_admin(&admin_text).await {
            Ok(()) => DeliveryStatus::Delivered,
            Err(err) => {
                warn!(task = %task.id(), %err, "admin notice failed");
                DeliveryStatus::Failed(err)
            }
        };
        Ok(CompletionReceipt::Completed {
            journal,
            admin_notice,
        })
    }

    async fn resend(&self, task: Task, channel: ChannelId) -> NotifierResult<NotifyReceipt> {
        let text = render_task_card(&task);
        let controls = task_controls(task.id());
        match self.gateway.send(&channel, &text, Some(controls)).await {
            Ok(message) => {
                let mut updated = task;
                match updated.link_message(channel, message) {
                    Ok(()) => self.tasks.update(&updated).await?,
                    Err(err) => warn!(task = %updated.id(), %err, "relink rejected"),
                }
                Ok(NotifyReceipt {
                    action: NotifyAction::Resent,
                    delivery: DeliveryStatus::Delivered,
                })
            }
            Err(err) => {
                warn!(task = %task.id(), channel = %channel, %err, "resend failed");
                Ok(NotifyReceipt {
                    action: NotifyAction::Resent,
                    delivery: DeliveryStatus::Failed(err),
                })
            }
        }
    }

    async fn journal_completion(
        &self,
        task: &Task,
        note: Option<&str>,
    ) -> NotifierResult<JournalWrite> {
        let Some(owner) = JournalOwner::from_scope(task.scope()) else {
            return Ok(JournalWrite::NoParent);
        };
        let stamp = self.clock.utc().format(HEADER_TIME_FORMAT);
        let text = format!(
            "[{stamp}] — Задача №{}: {}\n{}",
            task.id(),
            task.title(),
            completion_note(task, note),
        );
        match self.journal.append(owner, &text).await? {
            AppendOutcome::Appended { entry_id } => Ok(JournalWrite::Appended { owner, entry_id }),
            AppendOutcome::OwnerNotFound => {
                warn!(task = %task.id(), %owner, "completion journal skipped: no live parent");
                Ok(JournalWrite::NoParent)
            }
        }
    }
}

/// Maps a queue outcome onto the action the notifier attempted, keeping
/// concurrent interference visible instead of pretending it applied.
const fn action_from_outcome(outcome: TransitionOutcome, applied: NotifyAction) -> NotifyAction {
    match outcome {
        TransitionOutcome::Applied => applied,
        TransitionOutcome::Rejected(_) => NotifyAction::AlreadyQueued,
        TransitionOutcome::NotFound => NotifyAction::NotFound,
    }
}

/// Renders the chat card for a task: title, due date and note.
fn render_task_card(task: &Task) -> String {
    let mut text = format!(
        "Задача №{}: {}\nСрок: {}",
        task.id(),
        task.title(),
        task.due_date().format("%d.%m.%Y"),
    );
    if let Some(note) = task.note().map(str::trim).filter(|note| !note.is_empty()) {
        text.push('\n');
        text.push_str(note);
    }
    text
}

/// Inline controls riding on a task card; the transport renders them as
/// action buttons.
fn task_controls(id: TaskId) -> MessageControls {
    MessageControls::new(json!({
        "actions": [{ "kind": "done", "task": id.value() }]
    }))
}

/// Body of a completion journal entry, with the note fallback chain.
fn completion_note(task: &Task, note: Option<&str>) -> String {
    note.map(str::trim)
        .filter(|text| !text.is_empty())
        .or_else(|| task.note().map(str::trim).filter(|text| !text.is_empty()))
        .map_or_else(|| DEFAULT_COMPLETION_NOTE.to_owned(), ToOwned::to_owned)
}
