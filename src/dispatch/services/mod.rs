//! Application services for task dispatch.

mod notifier;
mod queue;
mod scope;

pub use notifier::{
    CompletionReceipt, DeliveryStatus, JournalWrite, NotifierError, NotifierResult, NotifyAction,
    NotifyReceipt, TaskNotifier,
};
pub use queue::{DispatchQueue, DispatchedTask, QueueError, QueueResult, TransitionOutcome};
pub use scope::{ScopeResolver, ScopeResult, TaskParents};
