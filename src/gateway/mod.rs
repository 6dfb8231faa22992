//! Gateway — the main event loop connecting the channel, memory, and provider.
//!
//! Routes each inbound message through identity resolution, the quoted-answer
//! check, command dispatch, or the free-text provider flow; runs the reminder
//! scheduler tick; handles graceful shutdown.

mod pipeline;
mod scheduler;


use crate::personality::PendingQuestion;
use secretaria_core::{
    config::SchedulerConfig,
    crypto::MessageCodec,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, Provider},
};
use secretaria_memory::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

/// The central gateway routing messages between the channel and the provider.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) channel: Arc<dyn Channel>,
    pub(super) memory: Store,
    pub(super) codec: MessageCodec,
    pub(super) scheduler_config: SchedulerConfig,
    /// Pending personality questions, keyed by user id. Entries expire
    /// after ten minutes so a stale quote cannot register an answer.
    pub(super) pending_questions: Mutex<HashMap<String, PendingQuestion>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        channel: Arc<dyn Channel>,
        memory: Store,
        codec: MessageCodec,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        Self {
            provider,
            channel,
            memory,
            codec,
            scheduler_config,
            pending_questions: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop until a shutdown signal arrives.
    ///
    /// Inbound messages are processed one at a time, in arrival order —
    /// conversation history replay depends on messages being persisted in
    /// creation order. The scheduler tick runs as an independent task.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "SecretarIA gateway running | provider: {} | channel: {}",
            self.provider.name(),
            self.channel.name(),
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel: {e}"))?;

        // Spawn scheduler loop.
        let sched_handle = if self.scheduler_config.enabled {
            let sched_store = self.memory.clone();
            let sched_channel = self.channel.clone();
            let tick_secs = self.scheduler_config.tick_secs;
            Some(tokio::spawn(async move {
                Self::scheduler_loop(sched_store, sched_channel, tick_secs).await;
            }))
        } else {
            None
        };

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                maybe_incoming = rx.recv() => {
                    match maybe_incoming {
                        Some(incoming) => self.handle_message(incoming).await,
                        None => {
                            info!("channel closed, stopping gateway");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&sched_handle).await;
        Ok(())
    }

    /// Graceful shutdown: stop the scheduler and the channel.
    async fn shutdown(&self, sched_handle: &Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = sched_handle {
            h.abort();
        }

        if let Err(e) = self.channel.stop().await {
            error!("failed to stop channel: {e}");
        }

        info!("Shutdown complete.");
    }

    /// Send a plain text reply back to the sender of `incoming`.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage::reply_to(incoming, text);
        if let Err(e) = self.channel.send(msg).await {
            error!("failed to send message: {e}");
        }
    }

    /// Claim the pending quiz question for this user if the quoted text is
    /// that question. Removes the entry on match; expired entries are purged.
    pub(super) async fn claim_pending_answer(&self, user_id: &str, quoted: &str) -> Option<String> {
        let mut pending = self.pending_questions.lock().await;
        crate::personality::claim_answer(&mut pending, user_id, quoted)
    }
}
