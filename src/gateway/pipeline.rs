//! Message processing pipeline — the main handle_message flow.

use super::Gateway;
use crate::commands::{self, CommandContext};
use crate::directive;
use chrono::Local;
use secretaria_core::{
    context::{Context, ContextEntry},
    error::SecretariaError,
    message::IncomingMessage,
    sanitize,
};
use secretaria_memory::{Profile, User};
use tracing::{error, info, warn};

/// System prompt sent with every completion. Teaches the model the reminder
/// directive so the parser can extract it from replies.
const SYSTEM_PROMPT: &str = "Eres SecretarIA, una secretaria personal virtual que atiende por \
WhatsApp. Respondes siempre en el idioma del usuario, de forma breve, cálida y servicial.\n\n\
Cuando el usuario te pida agendar o recordar algo con fecha y hora concretas, incluye en tu \
respuesta una línea con el formato exacto:\n\
!recordatorio <nombre> [<nombre>] [<MM:DD:HH:MM>]\n\
donde MM es el mes, DD el día, HH la hora (00-23) y MM los minutos, siempre con dos dígitos. \
Ejemplo: !recordatorio dentista [Cita con el dentista] [03:15:14:30]\n\
Si el usuario no da fecha y hora completas, pídeselas en lugar de emitir la línea.";

const PROVIDER_DOWN_REPLY: &str = "😔 *Lo siento, no puedo contactar con la secretaria en este \
momento.* Inténtalo de nuevo en unos minutos.";

const QUIZ_ACK_REPLY: &str = "✅ *¡Gracias!* He registrado tu respuesta. 🧠";

const COMMAND_FAILED_REPLY: &str =
    "⚠️ *No pude completar el comando.* Inténtalo de nuevo en unos minutos.";

const BROKEN_DIRECTIVE_NOTE: &str = "\n\n⚠️ _Detecté un intento de recordatorio que no pude \
interpretar. El formato es: `!recordatorio <nombre> [<nombre>] [<MM:DD:HH:MM>]`._";

impl Gateway {
    /// Process a single incoming message through the full pipeline.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!(
            "{} says: {}",
            incoming.sender_name.as_deref().unwrap_or(&incoming.sender_address),
            preview
        );

        // --- 1. IDENTITY ---
        // Resolution failure is fatal for this message: no reply is sent.
        let user = match self.memory.resolve_user(&incoming.sender_address).await {
            Ok(user) => user,
            Err(e) => {
                error!("identity resolution failed for {}: {e}", incoming.sender_address);
                return;
            }
        };
        let profile = match self.memory.ensure_active_profile(&user).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("active profile repair failed for {}: {e}", user.phone_address);
                return;
            }
        };

        // --- 2. QUOTED QUIZ ANSWER ---
        if let Some(ref quoted) = incoming.quoted_text {
            if let Some(question) = self.claim_pending_answer(&user.id, quoted).await {
                match self.record_quiz_answer(&profile, &question, &incoming.text).await {
                    Ok(()) => self.send_text(&incoming, QUIZ_ACK_REPLY).await,
                    Err(e) => error!("failed to record quiz answer: {e}"),
                }
                return;
            }
        }

        // --- 3. COMMAND ROUTE ---
        if incoming.text.trim_start().starts_with('!') {
            let ctx = CommandContext {
                store: &self.memory,
                user: &user,
                profile: &profile,
                pending_questions: &self.pending_questions,
            };
            match commands::handle(&incoming.text, &ctx).await {
                Ok(reply) => self.send_text(&incoming, &reply).await,
                Err(e) => {
                    error!("command failed for {}: {e}", user.phone_address);
                    self.send_text(&incoming, COMMAND_FAILED_REPLY).await;
                }
            }
            return;
        }

        // --- 4. FREE TEXT ---
        self.handle_free_text(&incoming, &user, &profile).await;
    }

    /// Forward free text to the provider with the profile's decrypted history,
    /// then either create a reminder from an embedded directive or persist and
    /// send the sanitized reply.
    async fn handle_free_text(&self, incoming: &IncomingMessage, user: &User, profile: &Profile) {
        let history = match self.decrypt_history(&profile.id).await {
            Ok(history) => history,
            Err(e) => {
                error!("history replay failed for profile {}: {e}", profile.number);
                return;
            }
        };

        // Timestamp annotation so the model can resolve "mañana" and friends.
        let annotated = format!(
            "{}\n(Hora actual: {})",
            incoming.text,
            Local::now().format("%Y-%m-%d %H:%M")
        );

        let context = Context {
            system_prompt: SYSTEM_PROMPT.to_string(),
            history,
            current_message: annotated,
            model: None,
        };

        let raw_reply = match self.provider.complete(&context).await {
            Ok(outgoing) => outgoing.text,
            Err(e) => {
                error!("provider call failed for {}: {e}", user.phone_address);
                self.send_text(incoming, PROVIDER_DOWN_REPLY).await;
                return;
            }
        };

        let sanitized = sanitize::strip_reasoning(&raw_reply);
        if sanitized.was_modified {
            warn!("stripped reasoning block from reply to {}", user.phone_address);
        }
        let reply = sanitized.text;

        // A reply carrying a reminder directive becomes a Reminder, not a Message.
        if let Some(d) = directive::parse_reminder_directive(&reply) {
            match self
                .memory
                .create_reminder(&user.id, &d.name, d.scheduled_at)
                .await
            {
                Ok(reminder) => {
                    info!("reminder created for {}: {}", user.phone_address, reminder.name);
                    self.send_text(
                        incoming,
                        &format!(
                            "✅ *Recordatorio añadido:* «{}» — {}",
                            reminder.name, reminder.scheduled_at
                        ),
                    )
                    .await;
                }
                Err(e) => error!("reminder creation failed: {e}"),
            }
            return;
        }

        let mut outgoing_text = format!("[Perfil {}] {}", profile.number, reply);
        if directive::looks_like_failed_directive(&reply) {
            warn!("unparseable reminder directive in reply to {}", user.phone_address);
            outgoing_text.push_str(BROKEN_DIRECTIVE_NOTE);
        }

        if let Err(e) = self.persist_turn(&profile.id, ContextEntry::assistant(&reply)).await {
            error!("failed to persist reply for profile {}: {e}", profile.number);
            return;
        }

        self.send_text(incoming, &outgoing_text).await;
    }

    /// Decrypt and deserialize a profile's history, oldest first. Corrupt
    /// records are skipped and logged rather than aborting the replay.
    async fn decrypt_history(&self, profile_id: &str) -> Result<Vec<ContextEntry>, SecretariaError> {
        let stored = self.memory.messages_for_profile(profile_id).await?;
        let mut history = Vec::with_capacity(stored.len());
        for message in stored {
            let plaintext = match self.codec.decrypt(&message.ciphertext) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    warn!("skipping undecryptable message {}: {e}", message.id);
                    continue;
                }
            };
            match serde_json::from_str::<ContextEntry>(&plaintext) {
                Ok(entry) => history.push(entry),
                Err(e) => warn!("skipping malformed message {}: {e}", message.id),
            }
        }
        Ok(history)
    }

    /// Encrypt and append one conversation turn to a profile's history.
    async fn persist_turn(
        &self,
        profile_id: &str,
        entry: ContextEntry,
    ) -> Result<(), SecretariaError> {
        let plaintext = serde_json::to_string(&entry)?;
        let ciphertext = self.codec.encrypt(&plaintext)?;
        self.memory.append_message(profile_id, &ciphertext).await?;
        Ok(())
    }

    /// Record a quoted quiz answer as an encrypted user-role turn.
    async fn record_quiz_answer(
        &self,
        profile: &Profile,
        question: &str,
        answer: &str,
    ) -> Result<(), SecretariaError> {
        let framed = format!("Respondí a la pregunta de personalidad «{question}»: {answer}");
        self.persist_turn(&profile.id, ContextEntry::user(framed)).await
    }
}
