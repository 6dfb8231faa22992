//! WhatsApp channel — pure Rust implementation via `whatsapp-rust`.
//!
//! Uses the WhatsApp Web protocol (Noise handshake + Signal encryption).
//! Pairing is done by scanning a QR code: the code is printed to the
//! terminal and also served as PNG by the HTTP pairing endpoint.
//! Session is persisted to `{data_dir}/whatsapp_session/whatsapp.db`.

mod bot;
mod channel;
mod events;
mod qr;
mod send;

#[cfg(test)]
mod tests;

pub use qr::{generate_qr_image, generate_qr_terminal};

use secretaria_core::config::WhatsAppConfig;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// WhatsApp channel using the WhatsApp Web protocol.
pub struct WhatsAppChannel {
    pub(super) config: WhatsAppConfig,
    pub(super) data_dir: String,
    /// Client handle for sending messages — set once the bot connects.
    pub(super) client: Arc<Mutex<Option<Arc<whatsapp_rust::client::Client>>>>,
    /// Message IDs we sent — used to ignore our own echo.
    pub(super) sent_ids: Arc<Mutex<HashSet<String>>>,
    /// Last QR code data while pairing is in progress. Cleared on connect
    /// so the pairing endpoint stops serving a stale code.
    pub(super) last_qr: Arc<Mutex<Option<String>>>,
}

impl WhatsAppChannel {
    /// Create a new WhatsApp channel from config.
    pub fn new(config: WhatsAppConfig, data_dir: &str) -> Self {
        Self {
            config,
            data_dir: data_dir.to_string(),
            client: Arc::new(Mutex::new(None)),
            sent_ids: Arc::new(Mutex::new(HashSet::new())),
            last_qr: Arc::new(Mutex::new(None)),
        }
    }

    /// Check if the WhatsApp client is currently connected.
    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }

    /// Current pairing QR payload, if a pairing is pending.
    pub async fn pending_qr(&self) -> Option<String> {
        self.last_qr.lock().await.clone()
    }

    /// Get the session database path.
    pub(super) fn session_db_path(&self) -> String {
        let dir = secretaria_core::config::shellexpand(&self.data_dir);
        let session_dir = format!("{dir}/whatsapp_session");
        // Ensure directory exists.
        let _ = std::fs::create_dir_all(&session_dir);
        format!("{session_dir}/whatsapp.db")
    }
}
