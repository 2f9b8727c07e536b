//! Gateway port for delivering task messages to chat channels.

use crate::dispatch::domain::{ChannelId, MessageRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Opaque presentation payload forwarded with an outbound message.
///
/// Carries whatever the concrete transport renders as inline controls
/// (action buttons and similar); this core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageControls(serde_json::Value);

impl MessageControls {
    /// Wraps a transport-specific controls payload.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped payload.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwraps the payload.
    #[must_use]
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Outbound side of the chat transport.
///
/// Delivery is fire-and-forget from the queue's perspective: a failed
/// send never rolls back an already-committed state transition. Callers
/// needing stronger guarantees must observe the failure in the returned
/// receipt and explicitly return the task to the queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Sends a message to a channel and returns the transport's reference
    /// to the created message.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the transport rejects or fails to
    /// deliver the message.
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        controls: Option<MessageControls>,
    ) -> GatewayResult<MessageRef>;

    /// Sends a plain informational message to an operator channel.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the transport rejects or fails to
    /// deliver the message.
    async fn notify_executor(&self, channel: &ChannelId, text: &str) -> GatewayResult<()>;

    /// Sends a plain informational message to the administrator.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the transport rejects or fails to
    /// deliver the message.
    async fn notify_admin(&self, text: &str) -> GatewayResult<()>;
}

/// Errors returned by gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The transport accepted the request but refused the message.
    #[error("channel rejected message: {0}")]
    Rejected(String),

    /// The transport could not be reached.
    #[error("transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl GatewayError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
