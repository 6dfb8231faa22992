//! `!recordatorios` — list reminders and delete one by its list position.

use super::CommandContext;
use once_cell::sync::Lazy;
use regex::Regex;
use secretaria_core::error::SecretariaError;

/// `-<n>` followed by the delete flag `-b`. Listing takes no argument, so
/// deletion is the only flagged form.
static DELETE_FLAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-(\d+)\s+-b\s*$").expect("recordatorios regex is valid"));

pub(super) async fn handle_recordatorios(
    ctx: &CommandContext<'_>,
    arg: &str,
) -> Result<String, SecretariaError> {
    let reminders = ctx.store.reminders_for_user(&ctx.user.id).await?;

    if arg.is_empty() {
        if reminders.is_empty() {
            return Ok("📭 No tienes recordatorios guardados.".to_string());
        }
        let mut out = String::from("⏰ *Tus recordatorios:*\n");
        for (i, r) in reminders.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. *{}* — {}{}",
                i + 1,
                r.name,
                r.scheduled_at,
                if r.delivered { " ✔" } else { "" }
            ));
        }
        out.push_str("\n\n📝 `!recordatorios -<número> -b` para borrar uno.");
        return Ok(out);
    }

    let Some(caps) = DELETE_FLAGS_RE.captures(arg) else {
        return Ok(
            "⚠️ *Formato incorrecto.*\n📝 Usa: `!recordatorios` para listar o `!recordatorios -<número> -b` para borrar."
                .to_string(),
        );
    };
    let Ok(position) = caps[1].parse::<usize>() else {
        return Ok("⚠️ *Número de recordatorio demasiado grande.*".to_string());
    };

    // Positions are 1-based, matching the listing.
    let Some(reminder) = position.checked_sub(1).and_then(|i| reminders.get(i)) else {
        return Ok(format!("❌ *No existe el recordatorio {position}.*"));
    };

    ctx.store
        .remove_reminder(&ctx.user.id, &reminder.id)
        .await?;
    Ok(format!("🗑️ *Recordatorio eliminado:* «{}»", reminder.name))
}
