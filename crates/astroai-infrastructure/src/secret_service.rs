//! API keys from `secret.json`, with environment fallback.

use astroai_core::config::SecretConfig;
use astroai_core::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::storage::AtomicFile;

pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const SERPAPI_KEY_ENV: &str = "SERPAPI_KEY";

/// Keys the HTTP collaborators need. `None` means not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub openrouter: Option<String>,
    pub serpapi: Option<String>,
}

impl ApiKeys {
    /// File values win; blank or missing ones are looked up with `env`.
    pub fn resolve(secrets: &SecretConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |file: Option<&str>, var: &str| {
            file.map(str::to_string)
                .or_else(|| env(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        };
        Self {
            openrouter: pick(
                secrets.openrouter.as_ref().and_then(|c| c.key()),
                OPENROUTER_KEY_ENV,
            ),
            serpapi: pick(secrets.serpapi.as_ref().and_then(|c| c.key()), SERPAPI_KEY_ENV),
        }
    }
}

/// Cached reader for `secret.json`.
#[derive(Debug, Clone)]
pub struct SecretService {
    file: Arc<AtomicFile<SecretConfig>>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicFile::json(path)),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads the file once. A missing file yields empty secrets.
    pub fn load_secrets(&self) -> Result<SecretConfig> {
        {
            let cached = self.secrets.read().unwrap_or_else(|e| e.into_inner());
            if let Some(secrets) = cached.as_ref() {
                return Ok(secrets.clone());
            }
        }

        let loaded = self.file.load()?.unwrap_or_default();
        *self.secrets.write().unwrap_or_else(|e| e.into_inner()) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Keys from the file, falling back to the process environment.
    pub fn api_keys(&self) -> Result<ApiKeys> {
        let secrets = self.load_secrets()?;
        Ok(ApiKeys::resolve(&secrets, |var| std::env::var(var).ok()))
    }

    pub fn secret_file_exists(&self) -> bool {
        self.file.path().exists()
    }
}
