//! Profile Service
//!
//! Owns the `profile` key. The in-memory profile is authoritative; storage
//! failures are logged and the profile is kept in memory regardless.

use std::sync::Arc;

use astroai_core::clock::Clock;
use astroai_core::error::Result;
use astroai_core::storage::{KeyValueStore, StorageKey, load_typed, save_typed};
use astroai_core::user::{ProfileDraft, UserProfile};
use tokio::sync::RwLock;

/// Result of a successful profile save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub profile: UserProfile,
    /// True when this save completed onboarding.
    pub first_save: bool,
    /// Today matches the date of birth.
    pub is_birthday: bool,
}

pub struct ProfileService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    profile: Arc<RwLock<UserProfile>>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            profile: Arc::new(RwLock::new(UserProfile::default())),
        }
    }

    /// Restores the persisted profile. A missing or unreadable profile
    /// yields an empty one.
    pub async fn load(&self) -> UserProfile {
        let loaded = match load_typed::<UserProfile>(self.store.as_ref(), StorageKey::Profile).await {
            Ok(Some(profile)) => {
                tracing::info!(
                    onboarding_complete = profile.onboarding_complete(),
                    "Loaded profile"
                );
                profile
            }
            Ok(None) => {
                tracing::info!("No stored profile");
                UserProfile::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load profile, starting empty: {}", e);
                UserProfile::default()
            }
        };

        *self.profile.write().await = loaded.clone();
        loaded
    }

    pub async fn profile(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    /// Validates and applies `draft`, then persists the profile.
    ///
    /// Only validation errors are returned; a failed write leaves the new
    /// profile in memory.
    pub async fn save(&self, draft: ProfileDraft) -> Result<SaveOutcome> {
        let mut profile = self.profile.write().await;
        let mut updated = profile.clone();
        let first_save = !updated.onboarding_complete();
        updated.apply(draft)?;

        if let Err(e) = save_typed(self.store.as_ref(), StorageKey::Profile, &updated).await {
            tracing::warn!("Failed to persist profile, keeping it in memory: {}", e);
        }

        *profile = updated.clone();
        let is_birthday = updated.is_birthday(self.clock.today());
        tracing::info!(
            zodiac = ?updated.zodiac_sign(),
            first_save,
            is_birthday,
            "Profile saved"
        );

        Ok(SaveOutcome {
            profile: updated,
            first_save,
            is_birthday,
        })
    }

    /// Wipes every stored key and resets the profile to empty.
    pub async fn delete_all_data(&self) {
        if let Err(e) = self.store.clear_all().await {
            tracing::warn!("Failed to clear stored data: {}", e);
        }
        *self.profile.write().await = UserProfile::default();
        tracing::info!("All user data deleted");
    }
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService").finish_non_exhaustive()
    }
}
