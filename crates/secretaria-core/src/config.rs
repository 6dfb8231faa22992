//! TOML configuration, source of record for every tunable in the process.
//!
//! `load` falls back to defaults when the file is absent, so a bare
//! `secretaria start` works once `MESSAGE_KEY` is exported.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SecretariaError;

/// Top-level SecretarIA configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub secretaria: SecretariaConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretariaConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SecretariaConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Message encryption settings.
///
/// The key is 64 hex characters (32 bytes). It may live here or in the
/// `MESSAGE_KEY` environment variable; the env var wins. Validation happens
/// when the codec is built — the process refuses to start on a bad key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CryptoConfig {
    #[serde(default)]
    pub message_key: String,
}

/// Memory config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Language-model provider config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Ollama backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Hard cap on one completion call, in seconds. A model that never
    /// answers must not stall the message forever.
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
        }
    }
}

/// Channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

/// WhatsApp channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Phone numbers allowed to talk to the assistant. Empty = everyone.
    #[serde(default)]
    pub allowed_numbers: Vec<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_numbers: Vec::new(),
        }
    }
}

/// Reminder scheduler config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between reminder ticks. The matching policy assumes one
    /// tick per minute.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: default_tick_secs(),
        }
    }
}

/// HTTP API config — serves the pairing QR image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// External base URL, used only to render the pairing log line.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            base_url: default_base_url(),
        }
    }
}

fn default_name() -> String {
    "SecretarIA".to_string()
}
fn default_data_dir() -> String {
    "~/.secretaria".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_db_path() -> String {
    "~/.secretaria/data/secretaria.db".to_string()
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_ollama_model() -> String {
    "deepseek-r1:7b".to_string()
}
fn default_ollama_timeout() -> u64 {
    120
}
fn default_true() -> bool {
    true
}
fn default_tick_secs() -> u64 {
    60
}
fn default_api_host() -> String {
    "0.0.0.0".to_string()
}
fn default_api_port() -> u16 {
    3015
}
fn default_base_url() -> String {
    "http://localhost".to_string()
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, falling back to defaults if the
/// file does not exist. `MESSAGE_KEY` in the environment overrides the
/// key from the file.
pub fn load(path: &str) -> Result<Config, SecretariaError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SecretariaError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| SecretariaError::Config(format!("failed to parse config: {e}")))?
    } else {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        Config::default()
    };

    if let Ok(key) = std::env::var("MESSAGE_KEY") {
        if !key.is_empty() {
            config.crypto.message_key = key;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.api.port, 3015);
        assert_eq!(cfg.scheduler.tick_secs, 60);
        assert_eq!(cfg.provider.ollama.model, "deepseek-r1:7b");
        assert!(cfg.crypto.message_key.is_empty());
        assert!(cfg.channel.whatsapp.enabled);
    }

    #[test]
    fn test_parse_partial_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            port = 8080

            [provider.ollama]
            model = "llama3"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.port, 8080);
        assert_eq!(cfg.provider.ollama.model, "llama3");
        // Untouched sections keep their defaults.
        assert_eq!(cfg.scheduler.tick_secs, 60);
        assert_eq!(cfg.api.base_url, "http://localhost");
    }

    #[test]
    fn test_shellexpand_home() {
        std::env::set_var("HOME", "/home/test");
        assert_eq!(shellexpand("~/x/y.db"), "/home/test/x/y.db");
        assert_eq!(shellexpand("/abs/path"), "/abs/path");
    }
}
