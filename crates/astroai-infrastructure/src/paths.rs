//! Path management for AstroAI files.
//!
//! ```text
//! <config_dir>/astroai/
//! ├── config.toml     # Application configuration
//! ├── secret.json     # API keys
//! ├── store.json      # Key-value store (profile, histories, cache, ...)
//! └── logs/           # Daily rolling log files
//! ```

use astroai_core::config::{ApiKeyConfig, SecretConfig};
use astroai_core::error::{AstroError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "astroai";

/// Files and directories managed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Secret,
    Store,
    Logs,
}

/// Resolves application paths under a base directory.
#[derive(Debug, Clone)]
pub struct AstroPaths {
    base: PathBuf,
}

impl AstroPaths {
    /// Uses `base` when given, else the platform config directory.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let base = match base {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| AstroError::config("Cannot find config directory"))?
                .join(APP_DIR),
        };
        Ok(Self { base })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn get_path(&self, service: ServiceType) -> PathBuf {
        match service {
            ServiceType::Config => self.base.join("config.toml"),
            ServiceType::Secret => self.base.join("secret.json"),
            ServiceType::Store => self.base.join("store.json"),
            ServiceType::Logs => self.base.join("logs"),
        }
    }

    /// Creates `secret.json` with empty keys if it is missing.
    ///
    /// On Unix the file is made readable by the owner only.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let path = self.get_path(ServiceType::Secret);
        if path.exists() {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            openrouter: Some(ApiKeyConfig {
                api_key: String::new(),
            }),
            serpapi: Some(ApiKeyConfig {
                api_key: String::new(),
            }),
        };
        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %path.display(), "Created secret file template");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let paths = AstroPaths::new(Some(Path::new("/tmp/astro"))).unwrap();
        assert_eq!(paths.get_path(ServiceType::Config), Path::new("/tmp/astro/config.toml"));
        assert_eq!(paths.get_path(ServiceType::Store), Path::new("/tmp/astro/store.json"));
        assert_eq!(paths.get_path(ServiceType::Logs), Path::new("/tmp/astro/logs"));
    }

    #[test]
    fn test_ensure_secret_file_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AstroPaths::new(Some(temp_dir.path())).unwrap();

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(template.openrouter.unwrap().key().is_none());

        std::fs::write(&path, r#"{"openrouter": {"api_key": "sk-test"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("sk-test"));
    }
}
