//! Per-user numbered profiles and the active-profile repair step.

use super::{Store, User};
use secretaria_core::error::SecretariaError;
use sqlx::FromRow;
use uuid::Uuid;

/// A conversational profile. History is scoped per profile, not per user.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub number: i64,
}

impl Store {
    /// Idempotent repair: make sure the user has an active profile, and
    /// return it.
    ///
    /// - No profiles at all → profile 1 is created and made active.
    /// - Profiles exist but the active pointer is null or dangling → the
    ///   first profile by creation order becomes active.
    ///
    /// Runs on every inbound message, so a user left in a broken state
    /// self-heals on next contact.
    pub async fn ensure_active_profile(&self, user: &User) -> Result<Profile, SecretariaError> {
        if let Some(ref active_id) = user.active_profile_id {
            let existing: Option<Profile> = sqlx::query_as(
                "SELECT id, user_id, number FROM profiles WHERE id = ? AND user_id = ?",
            )
            .bind(active_id)
            .bind(&user.id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("find active profile failed: {e}")))?;

            if let Some(profile) = existing {
                return Ok(profile);
            }
            tracing::warn!("active profile {active_id} of user {} is dangling", user.id);
        }

        let first: Option<Profile> = sqlx::query_as(
            "SELECT id, user_id, number FROM profiles WHERE user_id = ? \
             ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(&user.id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("list profiles failed: {e}")))?;

        let profile = match first {
            Some(p) => p,
            None => self.create_profile(&user.id, 1).await?,
        };

        self.set_active_profile(&user.id, &profile.id).await?;
        Ok(profile)
    }

    /// Create a profile with the given user-facing number.
    pub async fn create_profile(
        &self,
        user_id: &str,
        number: i64,
    ) -> Result<Profile, SecretariaError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO profiles (id, user_id, number) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(number)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("create profile failed: {e}")))?;

        Ok(Profile {
            id,
            user_id: user_id.to_string(),
            number,
        })
    }

    /// All profiles of a user, creation order.
    pub async fn profiles_for_user(&self, user_id: &str) -> Result<Vec<Profile>, SecretariaError> {
        sqlx::query_as(
            "SELECT id, user_id, number FROM profiles WHERE user_id = ? \
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("list profiles failed: {e}")))
    }

    /// Find a profile by its user-facing number.
    pub async fn find_profile_by_number(
        &self,
        user_id: &str,
        number: i64,
    ) -> Result<Option<Profile>, SecretariaError> {
        sqlx::query_as("SELECT id, user_id, number FROM profiles WHERE user_id = ? AND number = ?")
            .bind(user_id)
            .bind(number)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("find profile failed: {e}")))
    }

    /// Point the user's active-profile back-reference at the given profile.
    pub async fn set_active_profile(
        &self,
        user_id: &str,
        profile_id: &str,
    ) -> Result<(), SecretariaError> {
        sqlx::query("UPDATE users SET active_profile_id = ? WHERE id = ?")
            .bind(profile_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("set active profile failed: {e}")))?;
        Ok(())
    }

    /// Delete a profile and its messages. If it was the active one, the
    /// pointer is cleared and repaired on the user's next message.
    pub async fn delete_profile(&self, profile: &Profile) -> Result<(), SecretariaError> {
        sqlx::query("DELETE FROM messages WHERE profile_id = ?")
            .bind(&profile.id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete messages failed: {e}")))?;

        sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(&profile.id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete profile failed: {e}")))?;

        sqlx::query("UPDATE users SET active_profile_id = NULL WHERE id = ? AND active_profile_id = ?")
            .bind(&profile.user_id)
            .bind(&profile.id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("clear active profile failed: {e}")))?;

        Ok(())
    }
}
