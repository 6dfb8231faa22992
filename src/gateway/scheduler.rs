//! Reminder scheduler — the per-minute due scan and notification fan-out.

use super::Gateway;
use chrono::{Local, NaiveDateTime};
use secretaria_core::{message::OutgoingMessage, traits::Channel};
use secretaria_memory::{format_minute, truncate_to_minute, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

impl Gateway {
    /// Tick loop: scan for due reminders and notify their owners.
    ///
    /// Each tick completes its whole fan-out before the next one starts, so a
    /// reminder never races its own delivery mark.
    pub(super) async fn scheduler_loop(store: Store, channel: Arc<dyn Channel>, tick_secs: u64) {
        info!("reminder scheduler running, tick every {tick_secs}s");

        let mut interval = tokio::time::interval(Duration::from_secs(tick_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            tick(&store, &channel, Local::now().naive_local()).await;
        }
    }
}

/// One scheduler pass: find everything due at `now` (minute precision) and
/// send the notifications concurrently. Failures are logged, never
/// propagated — the loop must survive any single bad tick.
pub(super) async fn tick(store: &Store, channel: &Arc<dyn Channel>, now: NaiveDateTime) {
    let now = truncate_to_minute(now);

    let due = match store.find_due(now).await {
        Ok(due) => due,
        Err(e) => {
            error!("due-reminder scan failed: {e}");
            return;
        }
    };
    if due.is_empty() {
        return;
    }

    debug!("{} reminder(s) due at {}", due.len(), format_minute(now));

    // Only the exact-minute hit archives the reminder; the advance notices
    // (one day ahead, one day minus ten minutes ahead) leave it live.
    let exact = format_minute(now);

    let mut deliveries = JoinSet::new();
    for reminder in due {
        let store = store.clone();
        let channel = channel.clone();
        let final_notice = reminder.scheduled_at == exact;
        deliveries.spawn(async move {
            let message = OutgoingMessage {
                text: format!(
                    "⏰ *Recordatorio:* {} — {}",
                    reminder.name, reminder.scheduled_at
                ),
                reply_target: Some(format!("{}@s.whatsapp.net", reminder.phone_address)),
            };
            if let Err(e) = channel.send(message).await {
                error!("reminder delivery to {} failed: {e}", reminder.phone_address);
                return;
            }
            if final_notice {
                if let Err(e) = store.mark_delivered(&reminder.id).await {
                    error!("failed to archive reminder {}: {e}", reminder.id);
                }
            }
        });
    }
    while deliveries.join_next().await.is_some() {}
}
