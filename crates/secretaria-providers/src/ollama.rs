//! Ollama local model provider.
//!
//! Connects to a locally running Ollama server. No API key required.
//! Stateless: every call carries the full role-tagged history.

use async_trait::async_trait;
use secretaria_core::{
    config::OllamaConfig,
    context::{Context, ContextEntry},
    error::SecretariaError,
    message::OutgoingMessage,
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Ollama provider backed by a local server.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create from config values. The request timeout is a hard cap — a
    /// model that never answers must not stall a message forever.
    pub fn from_config(config: &OllamaConfig) -> Result<Self, SecretariaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SecretariaError::Provider(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

// --- Serde types ---

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct OllamaChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaChatMessage>,
}

/// Build Ollama-format messages from a context.
fn build_messages(system: &str, history: &[ContextEntry]) -> Vec<OllamaChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    if !system.is_empty() {
        messages.push(OllamaChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    for entry in history {
        messages.push(OllamaChatMessage {
            role: entry.role.clone(),
            content: entry.content.clone(),
        });
    }
    messages
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, SecretariaError> {
        let (system, history) = context.to_api_messages();
        let model = context.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/api/chat", self.base_url);

        let request = OllamaChatRequest {
            model: model.to_string(),
            messages: build_messages(&system, &history),
            stream: false,
        };

        debug!("ollama request: {} turns to {model}", request.messages.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SecretariaError::Provider(format!("ollama request timed out: {e}"))
                } else {
                    SecretariaError::Provider(format!("ollama request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SecretariaError::Provider(format!(
                "ollama returned {status}: {body}"
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| SecretariaError::Provider(format!("ollama response parse failed: {e}")))?;

        let text = parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| SecretariaError::Provider("ollama reply had no message".into()))?;

        Ok(OutgoingMessage {
            text,
            reply_target: None,
        })
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_prepends_system() {
        let history = vec![
            ContextEntry::user("hola"),
            ContextEntry::assistant("¿en qué te ayudo?"),
        ];
        let messages = build_messages("Eres una secretaria.", &history);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
    }

    #[test]
    fn test_build_messages_empty_system_omitted() {
        let messages = build_messages("", &[ContextEntry::user("hola")]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
