use crate::{
    context::Context,
    error::SecretariaError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Language-model backend — stateless request/response completion over a
/// role-tagged history.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a conversation context to the backend and get a reply.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, SecretariaError>;

    /// Check if the backend is reachable and ready.
    async fn is_available(&self) -> bool;
}

/// Chat transport — delivers inbound message events and sends replies.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, SecretariaError>;

    /// Send a message back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), SecretariaError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), SecretariaError>;
}
