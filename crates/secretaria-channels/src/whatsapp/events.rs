//! Incoming WhatsApp message handling — filtering, unwrapping, and forwarding.

use secretaria_core::message::IncomingMessage;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Extract the text body of a message, looking through the plain
/// `conversation` field and the extended-text wrapper.
fn message_text(msg: &waproto::whatsapp::Message) -> Option<&str> {
    msg.conversation.as_deref().or_else(|| {
        msg.extended_text_message
            .as_ref()
            .and_then(|e| e.text.as_deref())
    })
}

/// Text of the message this one quotes (a reply), if any.
fn quoted_text(msg: &waproto::whatsapp::Message) -> Option<String> {
    msg.extended_text_message
        .as_ref()
        .and_then(|e| e.context_info.as_ref())
        .and_then(|ctx| ctx.quoted_message.as_deref())
        .and_then(message_text)
        .map(str::to_string)
}

/// Process an incoming WhatsApp message event.
///
/// Drops group traffic and our own outbound echo, applies the allow-list,
/// unwraps nested wrappers, and forwards a normalized message to the gateway.
pub(super) async fn handle_whatsapp_message(
    msg: waproto::whatsapp::Message,
    info: wacore::types::message::MessageInfo,
    tx: &mpsc::Sender<IncomingMessage>,
    allowed: &[String],
    sent_ids: &Arc<Mutex<HashSet<String>>>,
) {
    debug!(
        "WA msg: is_group={}, is_from_me={}, sender={}, chat={}",
        info.source.is_group, info.source.is_from_me, info.source.sender.user, info.source.chat.user,
    );

    // One-on-one conversations only.
    if info.source.is_group {
        debug!("WA filtered: ignoring group message");
        return;
    }
    if info.source.is_from_me {
        debug!("WA filtered: ignoring own message");
        return;
    }

    let msg_id = info.id.clone();
    let phone = info.source.sender.user.clone();

    if sent_ids.lock().await.remove(&msg_id) {
        debug!("skipping own echo: {msg_id}");
        return;
    }

    if !allowed.is_empty() && !allowed.contains(&phone) {
        warn!("ignoring whatsapp message from unauthorized {phone}");
        return;
    }

    // Unwrap nested wrappers (device_sent, ephemeral, view_once).
    let inner = msg
        .device_sent_message
        .as_ref()
        .and_then(|d| d.message.as_deref())
        .or_else(|| {
            msg.ephemeral_message
                .as_ref()
                .and_then(|e| e.message.as_deref())
        })
        .or_else(|| {
            msg.view_once_message
                .as_ref()
                .and_then(|v| v.message.as_deref())
        })
        .unwrap_or(&msg);

    let Some(text) = message_text(inner).filter(|t| !t.is_empty()) else {
        debug!("WA filtered: no text content");
        return;
    };

    let chat_jid = info.source.chat.to_string();
    let sender_name = if info.push_name.is_empty() {
        None
    } else {
        Some(info.push_name.clone())
    };

    let incoming = IncomingMessage {
        id: Uuid::new_v4(),
        sender_address: phone,
        sender_name,
        text: text.to_string(),
        quoted_text: quoted_text(inner),
        timestamp: chrono::Utc::now(),
        reply_target: Some(chat_jid),
    };

    if tx.send(incoming).await.is_err() {
        info!("whatsapp channel receiver dropped");
    }
}
