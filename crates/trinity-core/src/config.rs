//! Configuration models.
//!
//! `AppConfig` is the non-secret part read from `config.toml`; `SecretConfig`
//! holds API keys read from `secret.json`. `TrinityConfig` is the merged
//! result after environment overrides.

use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub firebase: FirebaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseSettings {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Interval between refreshes of emulated live subscriptions
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Root structure of secret.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<ApiKeyConfig>,
    #[serde(default)]
    pub firebase: Option<ApiKeyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
}

/// Effective configuration after files and environment are merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrinityConfig {
    pub app: AppConfig,
    pub secrets: SecretConfig,
}

impl TrinityConfig {
    /// The language-model API key, if one is configured and non-blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        non_blank(self.secrets.gemini.as_ref().map(|c| c.api_key.as_str()))
    }

    pub fn firebase_api_key(&self) -> Option<&str> {
        non_blank(self.secrets.firebase.as_ref().map(|c| c.api_key.as_str()))
    }

    pub fn firebase_project_id(&self) -> Option<&str> {
        non_blank(self.app.firebase.project_id.as_deref())
    }

    pub fn model(&self) -> &str {
        &self.app.gemini.model
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
