use serde::{Deserialize, Serialize};

/// A single role-tagged turn in the conversation history.
///
/// Doubles as the plaintext schema for persisted messages: a stored message is
/// the encryption of one serialized `ContextEntry`, so replaying a profile's
/// history re-derives the role tags by decrypting in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl ContextEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Conversation context passed to the language-model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// Conversation history (oldest first).
    pub history: Vec<ContextEntry>,
    /// The current user message.
    pub current_message: String,
    /// Override the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Context {
    /// Create a context with just a current message and an empty history.
    pub fn new(message: &str) -> Self {
        Self {
            system_prompt: String::new(),
            history: Vec::new(),
            current_message: message.to_string(),
            model: None,
        }
    }

    /// Flatten into `(system_prompt, messages)` for chat-style APIs; the
    /// current message is appended as the final user turn.
    pub fn to_api_messages(&self) -> (String, Vec<ContextEntry>) {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.extend(self.history.iter().cloned());
        messages.push(ContextEntry::user(self.current_message.clone()));
        (self.system_prompt.clone(), messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_api_messages_appends_current_turn() {
        let ctx = Context {
            system_prompt: "Sé útil.".into(),
            history: vec![
                ContextEntry::user("Hola"),
                ContextEntry::assistant("¡Hola! ¿En qué te ayudo?"),
            ],
            current_message: "¿Qué día es hoy?".into(),
            model: None,
        };
        let (system, messages) = ctx.to_api_messages();
        assert_eq!(system, "Sé útil.");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "¿Qué día es hoy?");
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let entry = ContextEntry::assistant("respuesta");
        let json = serde_json::to_string(&entry).unwrap();
        let back: ContextEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
