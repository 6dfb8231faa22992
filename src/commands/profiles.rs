//! `!perfil` — list, switch-or-create, and delete conversation profiles.

use super::CommandContext;
use once_cell::sync::Lazy;
use regex::Regex;
use secretaria_core::error::SecretariaError;

/// `-<n>` optionally followed by the delete flag `-b`.
static PERFIL_FLAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-(\d+)(?:\s+(-b))?\s*$").expect("perfil regex is valid"));

pub(super) async fn handle_perfil(
    ctx: &CommandContext<'_>,
    arg: &str,
) -> Result<String, SecretariaError> {
    if arg.is_empty() {
        return list_profiles(ctx).await;
    }

    let Some(caps) = PERFIL_FLAGS_RE.captures(arg) else {
        return Ok(
            "⚠️ *Formato incorrecto.*\n📝 Usa: `!perfil -<número>` o `!perfil -<número> -b` para borrar."
                .to_string(),
        );
    };

    // The regex only admits digit sequences; overly long ones are a user typo.
    let Ok(number) = caps[1].parse::<i64>() else {
        return Ok("⚠️ *Número de perfil demasiado grande.*".to_string());
    };
    let delete = caps.get(2).is_some();

    if delete {
        delete_profile(ctx, number).await
    } else {
        switch_or_create_profile(ctx, number).await
    }
}

async fn list_profiles(ctx: &CommandContext<'_>) -> Result<String, SecretariaError> {
    let profiles = ctx.store.profiles_for_user(&ctx.user.id).await?;
    let mut out = String::from("👤 *Tus perfiles:*\n");
    for p in &profiles {
        out.push_str(&format!(
            "\n• Perfil {}{}",
            p.number,
            if p.id == ctx.profile.id { " ✅ (activo)" } else { "" }
        ));
    }
    out.push_str("\n\n📝 `!perfil -<número>` para cambiar o crear uno nuevo.");
    Ok(out)
}

async fn switch_or_create_profile(
    ctx: &CommandContext<'_>,
    number: i64,
) -> Result<String, SecretariaError> {
    if let Some(existing) = ctx
        .store
        .find_profile_by_number(&ctx.user.id, number)
        .await?
    {
        ctx.store
            .set_active_profile(&ctx.user.id, &existing.id)
            .await?;
        return Ok(format!("✅ *Cambiado al perfil {number}.*"));
    }

    let created = ctx.store.create_profile(&ctx.user.id, number).await?;
    ctx.store
        .set_active_profile(&ctx.user.id, &created.id)
        .await?;
    Ok(format!("✨ *Perfil {number} creado y activado.*"))
}

async fn delete_profile(ctx: &CommandContext<'_>, number: i64) -> Result<String, SecretariaError> {
    let Some(profile) = ctx
        .store
        .find_profile_by_number(&ctx.user.id, number)
        .await?
    else {
        return Ok(format!("❌ *No existe el perfil {number}.*"));
    };

    ctx.store.delete_profile(&profile).await?;
    Ok(format!(
        "🗑️ *Perfil {number} eliminado* junto con su historial de mensajes."
    ))
}
