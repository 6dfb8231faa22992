//! Channel trait implementation for WhatsApp.

use super::send::{retry_send, sanitize_for_whatsapp, split_message};
use super::WhatsAppChannel;
use async_trait::async_trait;
use secretaria_core::{
    error::SecretariaError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::info;
use wacore_binary::jid::Jid;

impl WhatsAppChannel {
    /// Send a text message to a JID string (phone@s.whatsapp.net).
    async fn send_text(&self, jid_str: &str, text: &str) -> Result<(), SecretariaError> {
        let client_guard = self.client.lock().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| SecretariaError::Channel("whatsapp client not connected".into()))?;

        let jid: Jid = jid_str.parse().map_err(|e| {
            SecretariaError::Channel(format!("invalid whatsapp JID '{jid_str}': {e}"))
        })?;

        let sanitized = sanitize_for_whatsapp(text);
        for chunk in split_message(&sanitized, 4096) {
            let msg = waproto::whatsapp::Message {
                conversation: Some(chunk),
                ..Default::default()
            };
            let msg_id = retry_send(client, &jid, msg).await?;
            // Track sent message ID to ignore our own echo.
            self.sent_ids.lock().await.insert(msg_id);
        }

        Ok(())
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, SecretariaError> {
        let (tx, rx) = mpsc::channel(64);
        self.build_and_run_bot(tx).await?;
        info!("WhatsApp channel started");
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), SecretariaError> {
        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| SecretariaError::Channel("no reply_target on outgoing message".into()))?;

        self.send_text(target, &message.text).await
    }

    async fn stop(&self) -> Result<(), SecretariaError> {
        info!("WhatsApp channel stopped");
        *self.client.lock().await = None;
        Ok(())
    }
}
