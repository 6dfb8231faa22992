use super::*;
use chrono::NaiveDate;
use secretaria_memory::Store;

const PHONE: &str = "5215550001111";

/// A store seeded with one user and their repaired active profile.
async fn seeded_store() -> (Store, User, Profile) {
    let store = Store::new_in_memory().await.unwrap();
    let user = store.resolve_user(PHONE).await.unwrap();
    let profile = store.ensure_active_profile(&user).await.unwrap();
    (store, user, profile)
}

async fn run(
    store: &Store,
    user: &User,
    profile: &Profile,
    pending: &Mutex<HashMap<String, PendingQuestion>>,
    text: &str,
) -> String {
    let ctx = CommandContext {
        store,
        user,
        profile,
        pending_questions: pending,
    };
    handle(text, &ctx).await.unwrap()
}

#[tokio::test]
async fn test_help_lists_commands_and_persists_nothing() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!help").await;
    assert!(reply.contains("Comandos Disponibles"));
    assert!(reply.contains("!perfil"));
    assert!(reply.contains("!recordatorios"));

    let messages = store.messages_for_profile(&profile.id).await.unwrap();
    assert!(messages.is_empty(), "command turns never touch the history");
}

#[tokio::test]
async fn test_unknown_command_points_at_help() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!frobnicate").await;
    assert!(reply.contains("Comando no reconocido"));
    assert!(reply.contains("!help"));
}

#[tokio::test]
async fn test_username_requires_argument() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!username").await;
    assert!(reply.contains("Debes especificar un nuevo nombre"));

    // Name is untouched.
    let unchanged = store.find_user(PHONE).await.unwrap().unwrap();
    assert_eq!(unchanged.display_name, "user");
}

#[tokio::test]
async fn test_username_renames_user() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!username Pablo").await;
    assert!(reply.contains("*Pablo*"));

    let renamed = store.find_user(PHONE).await.unwrap().unwrap();
    assert_eq!(renamed.display_name, "Pablo");
}

#[tokio::test]
async fn test_remove_deletes_user_and_everything_owned() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    store.append_message(&profile.id, "deadbeef").await.unwrap();
    let at = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    store.create_reminder(&user.id, "dentista", at).await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!remove").await;
    assert!(reply.contains("ha sido eliminado correctamente"));
    assert!(reply.contains(PHONE));

    assert!(store.find_user(PHONE).await.unwrap().is_none());
    assert!(store.profiles_for_user(&user.id).await.unwrap().is_empty());
    assert!(store.messages_for_profile(&profile.id).await.unwrap().is_empty());
    assert!(store.reminders_for_user(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_perfil_lists_and_marks_active() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    store.create_profile(&user.id, 2).await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!perfil").await;
    assert!(reply.contains("Perfil 1 ✅ (activo)"));
    assert!(reply.contains("Perfil 2"));
}

#[tokio::test]
async fn test_perfil_switch_creates_missing_profile() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!perfil -3").await;
    assert!(reply.contains("Perfil 3 creado y activado"));

    let created = store.find_profile_by_number(&user.id, 3).await.unwrap().unwrap();
    let refreshed = store.find_user(PHONE).await.unwrap().unwrap();
    assert_eq!(refreshed.active_profile_id.as_deref(), Some(created.id.as_str()));
}

#[tokio::test]
async fn test_perfil_switch_to_existing_profile() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let second = store.create_profile(&user.id, 2).await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!perfil -2").await;
    assert!(reply.contains("Cambiado al perfil 2"));

    let refreshed = store.find_user(PHONE).await.unwrap().unwrap();
    assert_eq!(refreshed.active_profile_id.as_deref(), Some(second.id.as_str()));
}

#[tokio::test]
async fn test_perfil_delete_removes_profile_and_history() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let second = store.create_profile(&user.id, 2).await.unwrap();
    store.append_message(&second.id, "cafebabe").await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!perfil -2 -b").await;
    assert!(reply.contains("Perfil 2 eliminado"));

    assert!(store.find_profile_by_number(&user.id, 2).await.unwrap().is_none());
    assert!(store.messages_for_profile(&second.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_perfil_delete_missing_profile() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!perfil -9 -b").await;
    assert!(reply.contains("No existe el perfil 9"));
}

#[tokio::test]
async fn test_perfil_rejects_bad_format() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    for bad in ["!perfil dos", "!perfil -b", "!perfil 2", "!perfil -2 -x"] {
        let reply = run(&store, &user, &profile, &pending, bad).await;
        assert!(reply.contains("Formato incorrecto"), "{bad} should be rejected");
    }
}

#[tokio::test]
async fn test_recordatorios_empty() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!recordatorios").await;
    assert!(reply.contains("No tienes recordatorios"));
}

#[tokio::test]
async fn test_recordatorios_lists_with_delivered_mark() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let at = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    store.create_reminder(&user.id, "dentista", at).await.unwrap();
    let done = store
        .create_reminder(&user.id, "llamar a mamá", at)
        .await
        .unwrap();
    store.mark_delivered(&done.id).await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!recordatorios").await;
    assert!(reply.contains("*dentista* — 2026-03-15 14:30:00"));
    assert!(reply.contains("*llamar a mamá* — 2026-03-15 14:30:00 ✔"));
}

#[tokio::test]
async fn test_recordatorios_delete_by_position() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let first = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let second = NaiveDate::from_ymd_opt(2026, 3, 16)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    store.create_reminder(&user.id, "dentista", first).await.unwrap();
    store.create_reminder(&user.id, "vuelo", second).await.unwrap();

    // Positions follow the soonest-first listing.
    let reply = run(&store, &user, &profile, &pending, "!recordatorios -1 -b").await;
    assert!(reply.contains("Recordatorio eliminado"));
    assert!(reply.contains("dentista"));

    let remaining = store.reminders_for_user(&user.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "vuelo");
}

#[tokio::test]
async fn test_recordatorios_delete_out_of_range() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let at = NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    store.create_reminder(&user.id, "dentista", at).await.unwrap();

    let reply = run(&store, &user, &profile, &pending, "!recordatorios -5 -b").await;
    assert!(reply.contains("No existe el recordatorio 5"));
    assert_eq!(store.reminders_for_user(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recordatorios_rejects_bad_format() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    for bad in ["!recordatorios borrar", "!recordatorios -1", "!recordatorios -b"] {
        let reply = run(&store, &user, &profile, &pending, bad).await;
        assert!(reply.contains("Formato incorrecto"), "{bad} should be rejected");
    }
}

#[tokio::test]
async fn test_personalidad_asks_and_registers_pending_question() {
    let (store, user, profile) = seeded_store().await;
    let pending = Mutex::new(HashMap::new());

    let reply = run(&store, &user, &profile, &pending, "!personalidad").await;
    assert!(reply.contains("Responde citando este mensaje"));

    let guard = pending.lock().await;
    let q = guard.get(&user.id).expect("question registered for the user");
    // The rendered reply quotes the stored question verbatim.
    assert!(reply.contains(&q.question));
}

#[tokio::test]
async fn test_parse_splits_command_and_argument() {
    let (cmd, arg) = Command::parse("  !username  Ana María ");
    assert!(matches!(cmd, Command::Username));
    assert_eq!(arg, "Ana María");

    let (cmd, arg) = Command::parse("!help");
    assert!(matches!(cmd, Command::Help));
    assert_eq!(arg, "");
}
