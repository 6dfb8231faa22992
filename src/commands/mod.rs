//! Built-in commands — instant responses, no provider call.

mod profiles;
mod reminders;

#[cfg(test)]
mod tests;

use crate::personality::{self, PendingQuestion};
use secretaria_core::error::SecretariaError;
use secretaria_memory::{Profile, Store, User};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub user: &'a User,
    pub profile: &'a Profile,
    /// Per-user pending personality questions, shared with the quoted-answer route.
    pub pending_questions: &'a Mutex<HashMap<String, PendingQuestion>>,
}

/// Known commands. Anything else starting with `!` is `Unknown`.
pub enum Command {
    Help,
    Remove,
    Username,
    Perfil,
    Recordatorios,
    Personalidad,
    Unknown,
}

impl Command {
    /// Parse the leading `!token` of a message body. Returns the command
    /// and the remaining argument text.
    pub fn parse(text: &str) -> (Self, &str) {
        let trimmed = text.trim_start();
        let token = trimmed.split_whitespace().next().unwrap_or("");
        let arg = trimmed[token.len()..].trim();
        let cmd = match token {
            "!help" => Self::Help,
            "!remove" => Self::Remove,
            "!username" => Self::Username,
            "!perfil" => Self::Perfil,
            "!recordatorios" => Self::Recordatorios,
            "!personalidad" => Self::Personalidad,
            _ => Self::Unknown,
        };
        (cmd, arg)
    }
}

const HELP_TEXT: &str = "🌟 *SecretarIA - Comandos Disponibles* 🌟\n\n\
    📌 `!help` - Muestra esta lista de comandos.\n\
    📝 `!username <nombre>` - Cambia tu nombre de usuario.\n\
    👤 `!perfil` - Lista tus perfiles. `!perfil -<n>` cambia o crea el perfil n; `!perfil -<n> -b` lo borra.\n\
    ⏰ `!recordatorios` - Lista tus recordatorios. `!recordatorios -<n> -b` borra el recordatorio n.\n\
    🧠 `!personalidad` - Te hago una pregunta del test de personalidad.\n\
    🚫 `!remove` - Elimina tu usuario y todos tus datos.\n\n\
    💬 Cualquier otro mensaje habla directamente con la secretaria.\n\n\
    ⚡ _¡Escribe un comando y explora SecretarIA!_";

/// Execute a command and return the reply text. Persistence failures
/// propagate to the caller; argument problems come back as corrective
/// reply strings.
pub async fn handle(text: &str, ctx: &CommandContext<'_>) -> Result<String, SecretariaError> {
    let (cmd, arg) = Command::parse(text);
    match cmd {
        Command::Help => Ok(HELP_TEXT.to_string()),

        Command::Remove => {
            let removed = ctx.store.remove_user(&ctx.user.id).await?;
            Ok(format!(
                "🚫 *{}* con número 📞 *{}* ha sido eliminado correctamente.",
                removed.display_name, removed.phone_address
            ))
        }

        Command::Username => {
            if arg.is_empty() {
                return Ok(
                    "⚠️ *Debes especificar un nuevo nombre de usuario.*\n\n📝 Ejemplo: `!username Pablo`"
                        .to_string(),
                );
            }
            ctx.store.change_display_name(&ctx.user.id, arg).await?;
            Ok(format!(
                "✅ *Nombre de usuario actualizado con éxito a:* *{arg}* 🎉"
            ))
        }

        Command::Perfil => profiles::handle_perfil(ctx, arg).await,

        Command::Recordatorios => reminders::handle_recordatorios(ctx, arg).await,

        Command::Personalidad => {
            let question = personality::random_question();
            ctx.pending_questions
                .lock()
                .await
                .insert(ctx.user.id.clone(), PendingQuestion::new(&question.question));
            Ok(personality::render_question(question))
        }

        Command::Unknown => Ok(
            "❌ *Comando no reconocido.*\n🤖 Usa `!help` para ver la lista de comandos disponibles."
                .to_string(),
        ),
    }
}
