//! Configuration loading.
//!
//! Reads `config.toml` and `secret.json`, then applies environment
//! overrides. Missing files fall back to defaults; malformed files are errors.

use crate::paths::TrinityPaths;
use std::path::Path;
use trinity_core::config::{ApiKeyConfig, AppConfig, SecretConfig, TrinityConfig};
use trinity_core::error::Result;

/// Environment variables holding the language-model API key, in priority order.
pub const GEMINI_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
pub const FIREBASE_KEY_VAR: &str = "FIREBASE_API_KEY";
pub const FIREBASE_PROJECT_VAR: &str = "FIREBASE_PROJECT_ID";
pub const MODEL_VAR: &str = "TRINITY_MODEL";

/// Loads the effective configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: TrinityPaths,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            paths: TrinityPaths::new(base_path)?,
        })
    }

    pub fn paths(&self) -> &TrinityPaths {
        &self.paths
    }

    /// Loads files and applies overrides from the process environment.
    pub fn load(&self) -> Result<TrinityConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Loads files and applies overrides from `lookup`.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<TrinityConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = TrinityConfig {
            app: self.load_app_config()?,
            secrets: self.load_secrets()?,
        };
        apply_env_overrides(&mut config, lookup);
        tracing::debug!(
            config_dir = %self.paths.config_dir().display(),
            model = %config.model(),
            gemini_configured = config.gemini_api_key().is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn load_app_config(&self) -> Result<AppConfig> {
        let path = self.paths.config_file();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    fn load_secrets(&self) -> Result<SecretConfig> {
        let path = self.paths.secret_file();
        if !path.exists() {
            return Ok(SecretConfig::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Environment values win over file values; blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut TrinityConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(api_key) = GEMINI_KEY_VARS.iter().find_map(|name| lookup(*name)) {
        config.secrets.gemini = Some(ApiKeyConfig { api_key });
    }
    if let Some(api_key) = lookup(FIREBASE_KEY_VAR) {
        config.secrets.firebase = Some(ApiKeyConfig { api_key });
    }
    if let Some(project_id) = lookup(FIREBASE_PROJECT_VAR) {
        config.app.firebase.project_id = Some(project_id);
    }
    if let Some(model) = lookup(MODEL_VAR) {
        config.app.gemini.model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use trinity_core::config::DEFAULT_GEMINI_MODEL;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service.load_with_env(env(&[])).unwrap();
        assert_eq!(config.model(), DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_api_key(), None);
    }

    #[test]
    fn test_files_are_read() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "[gemini]\nmodel = \"gemini-2.5-flash\"\n\n[firebase]\nproject_id = \"major-ai-trinity\"\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"file-key"}}"#,
        )
        .unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service.load_with_env(env(&[])).unwrap();
        assert_eq!(config.model(), "gemini-2.5-flash");
        assert_eq!(config.firebase_project_id(), Some("major-ai-trinity"));
        assert_eq!(config.gemini_api_key(), Some("file-key"));
    }

    #[test]
    fn test_environment_overrides_files() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("secret.json"),
            r#"{"gemini":{"api_key":"file-key"}}"#,
        )
        .unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        let config = service
            .load_with_env(env(&[("API_KEY", "env-key"), ("TRINITY_MODEL", "custom")]))
            .unwrap();
        assert_eq!(config.gemini_api_key(), Some("env-key"));
        assert_eq!(config.model(), "custom");
    }

    #[test]
    fn test_malformed_secret_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("secret.json"), "{not json").unwrap();
        let service = ConfigService::new(Some(temp_dir.path())).unwrap();

        assert!(service.load_with_env(env(&[])).is_err());
    }
}
