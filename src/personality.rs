//! Personality quiz questions — static reference data bundled at compile time,
//! plus the per-user pending-question bookkeeping for the quoted-answer flow.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// How long a quiz question stays answerable after being asked.
pub const PENDING_QUESTION_TTL: Duration = Duration::from_secs(10 * 60);

/// A quiz question waiting for a quoted-reply answer from one user.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub question: String,
    pub asked_at: Instant,
}

impl PendingQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            asked_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.asked_at.elapsed() > PENDING_QUESTION_TTL
    }
}

/// Claim the pending question for `user_id` if `quoted` quotes it.
///
/// The quoted text is the full rendered outbound message, so containment
/// (not equality) is the match criterion. A claimed or expired question is
/// removed; a non-matching quote leaves the entry pending.
pub fn claim_answer(
    pending: &mut std::collections::HashMap<String, PendingQuestion>,
    user_id: &str,
    quoted: &str,
) -> Option<String> {
    pending.retain(|_, q| !q.is_expired());

    let matches = pending
        .get(user_id)
        .is_some_and(|q| quoted.contains(&q.question));
    if matches {
        pending.remove(user_id).map(|q| q.question)
    } else {
        None
    }
}

/// One quiz question with its answer options.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonalityQuestion {
    pub question: String,
    pub options: Vec<String>,
}

static QUESTIONS: Lazy<Vec<PersonalityQuestion>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/questions.json"))
        .expect("bundled questions.json is valid")
});

/// Pick one random question from the bundled set.
pub fn random_question() -> &'static PersonalityQuestion {
    QUESTIONS
        .choose(&mut rand::thread_rng())
        .expect("bundled question set is non-empty")
}

/// Render a question with its numbered options for the chat.
pub fn render_question(q: &PersonalityQuestion) -> String {
    let mut out = format!("🧠 *Pregunta de personalidad:*\n{}\n", q.question);
    for (i, option) in q.options.iter().enumerate() {
        out.push_str(&format!("\n{}. {option}", i + 1));
    }
    out.push_str("\n\n_Responde citando este mensaje._");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_questions_load() {
        assert!(!QUESTIONS.is_empty());
        for q in QUESTIONS.iter() {
            assert!(!q.question.is_empty());
            assert!(q.options.len() >= 2, "each question needs options");
        }
    }

    #[test]
    fn test_random_question_comes_from_set() {
        let q = random_question();
        assert!(QUESTIONS.iter().any(|c| c.question == q.question));
    }

    #[test]
    fn test_claim_matches_quoted_question() {
        let mut pending = std::collections::HashMap::new();
        pending.insert("u1".to_string(), PendingQuestion::new("¿Té o café?"));

        let claimed = claim_answer(&mut pending, "u1", "🧠 *Pregunta:*\n¿Té o café?\n1. Té");
        assert_eq!(claimed.as_deref(), Some("¿Té o café?"));

        // Claimed once — a second quote of the same question finds nothing.
        assert!(claim_answer(&mut pending, "u1", "¿Té o café?").is_none());
    }

    #[test]
    fn test_claim_is_per_user() {
        let mut pending = std::collections::HashMap::new();
        pending.insert("u1".to_string(), PendingQuestion::new("¿Té o café?"));

        assert!(claim_answer(&mut pending, "u2", "¿Té o café?").is_none());
        assert!(claim_answer(&mut pending, "u1", "¿Té o café?").is_some());
    }

    #[test]
    fn test_expired_question_is_not_claimable() {
        let mut pending = std::collections::HashMap::new();
        let stale = PendingQuestion {
            question: "¿Té o café?".to_string(),
            asked_at: Instant::now() - PENDING_QUESTION_TTL - Duration::from_secs(1),
        };
        pending.insert("u1".to_string(), stale);

        assert!(claim_answer(&mut pending, "u1", "¿Té o café?").is_none());
        assert!(pending.is_empty(), "expired entry purged");
    }

    #[test]
    fn test_unrelated_quote_does_not_claim() {
        let mut pending = std::collections::HashMap::new();
        pending.insert("u1".to_string(), PendingQuestion::new("¿Té o café?"));

        assert!(claim_answer(&mut pending, "u1", "otro mensaje cualquiera").is_none());
        assert!(
            pending.contains_key("u1"),
            "question stays pending after a non-matching quote"
        );
    }

    #[test]
    fn test_render_numbers_options() {
        let q = PersonalityQuestion {
            question: "¿Té o café?".to_string(),
            options: vec!["Té".to_string(), "Café".to_string()],
        };
        let rendered = render_question(&q);
        assert!(rendered.contains("¿Té o café?"));
        assert!(rendered.contains("1. Té"));
        assert!(rendered.contains("2. Café"));
    }
}
