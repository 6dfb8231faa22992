//! Append-only encrypted message log, scoped per profile.

use super::Store;
use secretaria_core::error::SecretariaError;
use sqlx::FromRow;
use uuid::Uuid;

/// One stored message. `ciphertext` is the hex sealed blob produced by the
/// codec; the store never sees plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct StoredMessage {
    pub id: String,
    pub profile_id: String,
    pub ciphertext: String,
}

impl Store {
    /// Append a sealed message to a profile's history.
    pub async fn append_message(
        &self,
        profile_id: &str,
        ciphertext: &str,
    ) -> Result<(), SecretariaError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO messages (id, profile_id, ciphertext) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(profile_id)
            .bind(ciphertext)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("append message failed: {e}")))?;
        Ok(())
    }

    /// All messages of a profile in creation order — the order the
    /// conversation replays in.
    pub async fn messages_for_profile(
        &self,
        profile_id: &str,
    ) -> Result<Vec<StoredMessage>, SecretariaError> {
        sqlx::query_as(
            "SELECT id, profile_id, ciphertext FROM messages WHERE profile_id = ? \
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(profile_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("list messages failed: {e}")))
    }
}
