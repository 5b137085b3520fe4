//! Loads `config.toml`, writing the defaults on first run.

use astroai_core::config::AppConfig;
use astroai_core::error::Result;
use std::sync::{Arc, RwLock};

use crate::paths::{AstroPaths, ServiceType};
use crate::storage::AtomicFile;

/// Cached access to the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: Arc<AtomicFile<AppConfig>>,
    cached: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &AstroPaths) -> Self {
        Self {
            file: Arc::new(AtomicFile::toml(paths.get_path(ServiceType::Config))),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, creating the file with defaults if it does
    /// not exist yet.
    pub fn load_or_create(&self) -> Result<AppConfig> {
        {
            let cached = self.cached.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let config = match self.file.load()? {
            Some(config) => config,
            None => {
                let config = AppConfig::default();
                self.file.save(&config)?;
                tracing::info!(path = %self.file.path().display(), "Wrote default configuration");
                config
            }
        };

        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }
}
