//! Reminder directive parsing.
//!
//! The model is prompted to embed `!recordatorio <nombre> [<texto>] [<MM:DD:HH:MM>]`
//! inside otherwise free-form replies. This module parses the directive back
//! out. Model output is not guaranteed to start with the directive, so the
//! `!` may appear anywhere in the reply.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Name from the first bracket group, date from a strict `NN:NN:NN:NN`
/// second bracket group (month:day:hour:minute).
static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!recordatorio[^\[\n]*\[([^\]]+)\]\s*\[(\d{2}):(\d{2}):(\d{2}):(\d{2})\]")
        .expect("directive regex is valid")
});

/// A parsed reminder instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDirective {
    pub name: String,
    pub scheduled_at: NaiveDateTime,
}

/// Extract a reminder directive from a model reply, if one is present.
///
/// The year is resolved to the current year at parse time; seconds are
/// zero. Returns `None` on no match or an impossible calendar date —
/// malformed directives never panic.
pub fn parse_reminder_directive(reply: &str) -> Option<ReminderDirective> {
    let caps = DIRECTIVE_RE.captures(reply)?;

    let name = caps.get(1)?.as_str().trim().to_string();
    if name.is_empty() {
        return None;
    }

    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;

    let scheduled_at = NaiveDate::from_ymd_opt(Local::now().year(), month, day)?
        .and_hms_opt(hour, minute, 0)?;

    Some(ReminderDirective { name, scheduled_at })
}

/// True when a reply looks like a reminder attempt that did not parse.
/// The dispatcher uses this to warn the user instead of silently storing
/// the broken directive as plain conversation text.
pub fn looks_like_failed_directive(reply: &str) -> bool {
    reply.contains("!recordatorio") && parse_reminder_directive(reply).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Local, Timelike};

    #[test]
    fn test_parse_full_directive() {
        let directive =
            parse_reminder_directive("!recordatorio Dentist [Dentist] [03:15:14:30]").unwrap();
        assert_eq!(directive.name, "Dentist");
        assert_eq!(directive.scheduled_at.year(), Local::now().year());
        assert_eq!(directive.scheduled_at.month(), 3);
        assert_eq!(directive.scheduled_at.day(), 15);
        assert_eq!(directive.scheduled_at.hour(), 14);
        assert_eq!(directive.scheduled_at.minute(), 30);
        assert_eq!(directive.scheduled_at.second(), 0);
    }

    #[test]
    fn test_parse_embedded_mid_reply() {
        let reply = "¡Claro! Te lo anoto.\n!recordatorio cita [Cita médica] [06:01:09:00]\n¿Algo más?";
        let directive = parse_reminder_directive(reply).unwrap();
        assert_eq!(directive.name, "Cita médica");
        assert_eq!(directive.scheduled_at.month(), 6);
        assert_eq!(directive.scheduled_at.hour(), 9);
    }

    #[test]
    fn test_plain_text_is_not_a_directive() {
        assert!(parse_reminder_directive("just chatting").is_none());
        assert!(parse_reminder_directive("").is_none());
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        // Single-digit fields do not satisfy the strict NN pattern.
        assert!(parse_reminder_directive("!recordatorio x [x] [3:15:14:30]").is_none());
        // Nonexistent calendar date.
        assert!(parse_reminder_directive("!recordatorio x [x] [02:30:10:00]").is_none());
        // Out-of-range time.
        assert!(parse_reminder_directive("!recordatorio x [x] [03:15:25:00]").is_none());
    }

    #[test]
    fn test_missing_date_group_is_no_match() {
        assert!(parse_reminder_directive("!recordatorio Dentist [Dentist]").is_none());
    }

    #[test]
    fn test_failed_directive_detection() {
        assert!(looks_like_failed_directive("!recordatorio mañana a las 3"));
        assert!(!looks_like_failed_directive(
            "!recordatorio x [x] [03:15:14:30]"
        ));
        assert!(!looks_like_failed_directive("hola, ¿qué tal?"));
    }
}
