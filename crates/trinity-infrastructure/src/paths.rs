//! Unified path management for trinity configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/trinity/       # Config directory (platform config dir + "trinity")
//! ├── config.toml          # Model, project id, polling, log level
//! └── secret.json          # API keys
//! ```

use std::path::{Path, PathBuf};
use trinity_core::config::{ApiKeyConfig, SecretConfig};
use trinity_core::error::{Result, TrinityError};

const APP_DIR: &str = "trinity";

/// Resolves configuration file locations.
///
/// A base directory can be given to keep everything inside one folder
/// (tests, portable installs); otherwise the platform config directory is used.
#[derive(Debug, Clone)]
pub struct TrinityPaths {
    config_dir: PathBuf,
}

impl TrinityPaths {
    /// Creates a path resolver.
    ///
    /// # Errors
    ///
    /// `Config` when no base is given and the platform config directory
    /// cannot be determined.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let config_dir = match base_path {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| TrinityError::config("Cannot find home directory"))?
                .join(APP_DIR),
        };
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to secret.json.
    ///
    /// # Security Note
    ///
    /// Keep this file readable by the owner only.
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    /// Creates secret.json with empty keys if it does not exist yet.
    ///
    /// The file is created with mode 600 on Unix.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.config_dir)?;

        let template = SecretConfig {
            gemini: Some(ApiKeyConfig {
                api_key: String::new(),
            }),
            firebase: Some(ApiKeyConfig {
                api_key: String::new(),
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_live_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrinityPaths::new(Some(temp_dir.path())).unwrap();

        assert!(paths.config_file().ends_with("config.toml"));
        assert!(paths.secret_file().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrinityPaths::new(Some(temp_dir.path().join("nested").as_path())).unwrap();

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(template.gemini.unwrap().api_key, "");

        std::fs::write(&path, r#"{"gemini":{"api_key":"k"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"k\""));
    }
}
