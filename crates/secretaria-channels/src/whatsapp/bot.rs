//! Bot construction and event wiring.

use super::events::handle_whatsapp_message;
use super::qr::generate_qr_terminal;
use super::WhatsAppChannel;
use crate::session_store::SessionStore;
use secretaria_core::{error::SecretariaError, message::IncomingMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wacore::types::events::Event;
use whatsapp_rust::bot::Bot;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

impl WhatsAppChannel {
    /// Build the whatsapp-rust bot, wire its event loop, and start it.
    ///
    /// On first run there is no stored device, so the bot emits rotating
    /// pairing QR codes. Each one is printed to the terminal and buffered
    /// for the HTTP pairing endpoint. Once paired (or on reconnect with a
    /// stored session) the client handle is captured for sending.
    pub(super) async fn build_and_run_bot(
        &self,
        tx: mpsc::Sender<IncomingMessage>,
    ) -> Result<(), SecretariaError> {
        let db_path = self.session_db_path();
        let backend = Arc::new(
            SessionStore::new(&db_path)
                .await
                .map_err(|e| SecretariaError::Channel(format!("whatsapp store init failed: {e}")))?,
        );

        let allowed = self.config.allowed_numbers.clone();
        let client_store = Arc::clone(&self.client);
        let sent_ids = Arc::clone(&self.sent_ids);
        let last_qr = Arc::clone(&self.last_qr);

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .with_os_info(Some("SECRETARIA".to_string()), None)
            .on_event(move |event, client| {
                let tx = tx.clone();
                let allowed = allowed.clone();
                let client_store = Arc::clone(&client_store);
                let sent_ids = Arc::clone(&sent_ids);
                let last_qr = Arc::clone(&last_qr);
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            *last_qr.lock().await = Some(code.clone());
                            match generate_qr_terminal(&code) {
                                Ok(rendered) => {
                                    info!("scan this QR code with WhatsApp to pair:\n{rendered}");
                                }
                                Err(e) => warn!("QR render failed: {e}"),
                            }
                        }
                        Event::PairSuccess(_) => {
                            info!("WhatsApp pairing completed");
                        }
                        Event::Connected(_) => {
                            *client_store.lock().await = Some(client);
                            *last_qr.lock().await = None;
                            info!("WhatsApp client connected");
                        }
                        Event::Disconnected(_) => {
                            warn!("WhatsApp client disconnected");
                        }
                        Event::Message(msg, msg_info) => {
                            handle_whatsapp_message(
                                *msg,
                                msg_info,
                                &tx,
                                &allowed,
                                &sent_ids,
                            )
                            .await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| SecretariaError::Channel(format!("whatsapp bot build failed: {e}")))?;

        let _handle = bot
            .run()
            .await
            .map_err(|e| SecretariaError::Channel(format!("whatsapp bot run failed: {e}")))?;

        Ok(())
    }
}
