use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from the chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Sender address at the transport level (phone number, no JID suffix).
    pub sender_address: String,
    /// Human-readable sender name, if the transport provides one.
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    /// Text of the message this one quotes, if any.
    #[serde(default)]
    pub quoted_text: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the reply (e.g. WhatsApp JID).
    #[serde(default)]
    pub reply_target: Option<String>,
}

/// An outgoing message to send back through the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform-specific target for routing (e.g. WhatsApp JID).
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl OutgoingMessage {
    /// Build a reply addressed at the sender of `incoming`.
    pub fn reply_to(incoming: &IncomingMessage, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_target: incoming.reply_target.clone(),
        }
    }
}
