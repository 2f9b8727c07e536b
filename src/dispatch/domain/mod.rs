//! Domain model for task dispatch.
//!
//! The dispatch domain models the task delivery lifecycle (idle, queued,
//! sent), the deal/policy scope a task is attached to, and read-only
//! summaries of the CRM records a task resolves to, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod party;
mod scope;
mod task;

pub use error::{DispatchEvent, ParseDispatchPhaseError, TransitionError};
pub use ids::{ChannelId, ClientId, DealId, MessageRef, PolicyId, TaskId};
pub use party::{ClientSummary, DealSummary, PolicySummary};
pub use scope::{QueueScope, Scope};
pub use task::{DispatchPhase, DispatchState, PersistedTaskData, Task};
