//! Owns the `language` and `disclaimer-accepted` keys.

use std::sync::Arc;

use astroai_core::language::Language;
use astroai_core::storage::{KeyValueStore, StorageKey, load_typed, save_typed};
use tokio::sync::RwLock;

pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
    language: Arc<RwLock<Option<Language>>>,
    disclaimer: Arc<RwLock<Option<bool>>>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            language: Arc::new(RwLock::new(None)),
            disclaimer: Arc::new(RwLock::new(None)),
        }
    }

    /// The chosen interface language, English until one is picked.
    pub async fn language(&self) -> Language {
        if let Some(language) = *self.language.read().await {
            return language;
        }

        let language = match load_typed::<Language>(self.store.as_ref(), StorageKey::Language).await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read language, using default: {}", e);
                Language::default()
            }
        };
        *self.language.write().await = Some(language);
        language
    }

    pub async fn set_language(&self, language: Language) {
        *self.language.write().await = Some(language);
        if let Err(e) = save_typed(self.store.as_ref(), StorageKey::Language, &language).await {
            tracing::warn!(%language, "Failed to persist language: {}", e);
        }
        tracing::info!(%language, "Language changed");
    }

    pub async fn disclaimer_accepted(&self) -> bool {
        if let Some(accepted) = *self.disclaimer.read().await {
            return accepted;
        }

        let accepted = match load_typed::<bool>(self.store.as_ref(), StorageKey::DisclaimerAccepted).await {
            Ok(accepted) => accepted.unwrap_or(false),
            Err(e) => {
                tracing::warn!("Failed to read disclaimer flag: {}", e);
                false
            }
        };
        *self.disclaimer.write().await = Some(accepted);
        accepted
    }

    /// Holds for the session even when the store rejects the write.
    pub async fn accept_disclaimer(&self) {
        *self.disclaimer.write().await = Some(true);
        if let Err(e) = save_typed(self.store.as_ref(), StorageKey::DisclaimerAccepted, &true).await {
            tracing::warn!("Failed to persist disclaimer flag: {}", e);
        }
        tracing::info!("Disclaimer accepted");
    }

    /// Drops cached values after the store was wiped.
    pub async fn forget(&self) {
        *self.language.write().await = None;
        *self.disclaimer.write().await = None;
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService").finish_non_exhaustive()
    }
}
