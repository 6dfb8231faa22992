//! Reminder CRUD and the three-offset due matcher.
//!
//! A reminder stores only its target instant, minute precision. The matcher
//! reverse-engineers, on every tick, which stored instants are due under the
//! three lead times: one day ahead, one day minus ten minutes ahead, and the
//! exact minute.

use super::Store;
use chrono::{Duration, NaiveDateTime, Timelike};
use secretaria_core::error::SecretariaError;
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical minute-precision timestamp format. All matching is string
/// equality on this shape, so seconds are always ":00".
const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in the canonical stored shape, seconds zeroed.
pub fn format_minute(ts: NaiveDateTime) -> String {
    truncate_to_minute(ts).format(MINUTE_FORMAT).to_string()
}

/// Zero the seconds and sub-second components.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// A stored reminder.
#[derive(Debug, Clone, FromRow)]
pub struct Reminder {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub scheduled_at: String,
    pub delivered: bool,
}

/// A reminder matched by the due scanner, joined with its owner's address
/// so the scheduler can notify without a second lookup.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub scheduled_at: String,
    pub phone_address: String,
}

impl Store {
    /// Create a reminder at the given target instant (seconds zeroed).
    pub async fn create_reminder(
        &self,
        user_id: &str,
        name: &str,
        scheduled_at: NaiveDateTime,
    ) -> Result<Reminder, SecretariaError> {
        let id = Uuid::new_v4().to_string();
        let stamp = format_minute(scheduled_at);
        sqlx::query("INSERT INTO reminders (id, user_id, name, scheduled_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(name)
            .bind(&stamp)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("create reminder failed: {e}")))?;

        Ok(Reminder {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            scheduled_at: stamp,
            delivered: false,
        })
    }

    /// Delete a reminder owned by the given user. Returns whether a row
    /// actually went away.
    pub async fn remove_reminder(
        &self,
        user_id: &str,
        reminder_id: &str,
    ) -> Result<bool, SecretariaError> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ? AND user_id = ?")
            .bind(reminder_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete reminder failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// All reminders of a user, soonest first. Delivered ones stay listed
    /// until explicitly removed.
    pub async fn reminders_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Reminder>, SecretariaError> {
        sqlx::query_as(
            "SELECT id, user_id, name, scheduled_at, delivered FROM reminders \
             WHERE user_id = ? ORDER BY scheduled_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("list reminders failed: {e}")))
    }

    /// Reminders due at `now` under the three-offset policy: target equals
    /// `now`, `now + 1 day`, or `now + 1 day − 10 minutes`. Delivered
    /// reminders are excluded.
    pub async fn find_due(&self, now: NaiveDateTime) -> Result<Vec<DueReminder>, SecretariaError> {
        let now = truncate_to_minute(now);
        let exact = format_minute(now);
        let day_ahead = format_minute(now + Duration::days(1));
        let day_ahead_minus_ten = format_minute(now + Duration::days(1) - Duration::minutes(10));

        sqlx::query_as(
            "SELECT r.id, r.user_id, r.name, r.scheduled_at, u.phone_address \
             FROM reminders r JOIN users u ON u.id = r.user_id \
             WHERE r.delivered = 0 AND r.scheduled_at IN (?, ?, ?)",
        )
        .bind(&exact)
        .bind(&day_ahead)
        .bind(&day_ahead_minus_ten)
        .fetch_all(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("find due reminders failed: {e}")))
    }

    /// Archive a reminder after its exact-minute notification fired, so it
    /// never matches another tick.
    pub async fn mark_delivered(&self, reminder_id: &str) -> Result<(), SecretariaError> {
        sqlx::query("UPDATE reminders SET delivered = 1 WHERE id = ?")
            .bind(reminder_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("mark delivered failed: {e}")))?;
        Ok(())
    }
}
