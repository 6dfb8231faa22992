//! User lookup, creation, rename, and removal.

use super::Store;
use secretaria_core::error::SecretariaError;
use sqlx::FromRow;
use uuid::Uuid;

/// A user, keyed by its transport-level phone address.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub phone_address: String,
    pub display_name: String,
    pub active_profile_id: Option<String>,
}

impl Store {
    /// Find a user by phone address, or create one on first contact.
    ///
    /// Read-plus-create only — active-profile repair is a separate,
    /// explicitly invoked step (`ensure_active_profile`).
    pub async fn resolve_user(&self, phone_address: &str) -> Result<User, SecretariaError> {
        if let Some(user) = self.find_user(phone_address).await? {
            return Ok(user);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO users (id, phone_address, display_name) VALUES (?, ?, 'user')")
            .bind(&id)
            .bind(phone_address)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("create user failed: {e}")))?;

        tracing::info!("new user created for {phone_address}");

        Ok(User {
            id,
            phone_address: phone_address.to_string(),
            display_name: "user".to_string(),
            active_profile_id: None,
        })
    }

    /// Find a user by phone address.
    pub async fn find_user(&self, phone_address: &str) -> Result<Option<User>, SecretariaError> {
        sqlx::query_as(
            "SELECT id, phone_address, display_name, active_profile_id \
             FROM users WHERE phone_address = ?",
        )
        .bind(phone_address)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("find user failed: {e}")))
    }

    /// Rename a user.
    pub async fn change_display_name(
        &self,
        user_id: &str,
        new_name: &str,
    ) -> Result<(), SecretariaError> {
        sqlx::query("UPDATE users SET display_name = ? WHERE id = ?")
            .bind(new_name)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("rename user failed: {e}")))?;
        Ok(())
    }

    /// Remove a user and everything it owns: profiles, their messages, and
    /// reminders. Returns the removed user for the confirmation reply.
    pub async fn remove_user(&self, user_id: &str) -> Result<User, SecretariaError> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, phone_address, display_name, active_profile_id FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("find user failed: {e}")))?;

        let user = user.ok_or_else(|| SecretariaError::NotFound(format!("user {user_id}")))?;

        sqlx::query(
            "DELETE FROM messages WHERE profile_id IN (SELECT id FROM profiles WHERE user_id = ?)",
        )
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(|e| SecretariaError::Memory(format!("delete messages failed: {e}")))?;

        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete profiles failed: {e}")))?;

        sqlx::query("DELETE FROM reminders WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete reminders failed: {e}")))?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| SecretariaError::Memory(format!("delete user failed: {e}")))?;

        Ok(user)
    }
}
