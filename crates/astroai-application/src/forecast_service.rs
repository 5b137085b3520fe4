//! Forecast Cache
//!
//! One persisted slot (`forecast-cache`) holding the last live daily
//! forecast. A lookup is a hit only when the local day, the sign and the
//! language all match. Live fetches for the same key are shared between
//! concurrent callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use astroai_core::clock::Clock;
use astroai_core::forecast::{
    DailyForecast, FallbackMessages, ForecastCacheEntry, ForecastKey, ForecastOrigin, ForecastSign,
};
use astroai_core::gateway::ForecastFetcher;
use astroai_core::language::Language;
use astroai_core::storage::{KeyValueStore, StorageKey, load_typed, save_typed};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::RwLock;

type SharedFetch = Shared<BoxFuture<'static, Option<String>>>;

pub struct ForecastCache {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn ForecastFetcher>,
    clock: Arc<dyn Clock>,
    fallbacks: FallbackMessages,
    slot: Arc<RwLock<Option<ForecastCacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<ForecastKey, SharedFetch>>>,
}

impl ForecastCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn ForecastFetcher>,
        clock: Arc<dyn Clock>,
        fallbacks: FallbackMessages,
    ) -> Self {
        Self {
            store,
            fetcher,
            clock,
            fallbacks,
            slot: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Today's forecast for `sign` in `language`.
    ///
    /// Never fails: when the fetch errors or yields nothing, a fallback
    /// message for the day is returned and the slot is left untouched.
    pub async fn get_or_fetch(&self, sign: ForecastSign, language: Language) -> DailyForecast {
        let key = ForecastKey::new(self.clock.today(), sign, language);

        if let Some(entry) = self.cached_entry().await {
            if entry.matches(&key) {
                tracing::info!(sign = %key.sign, lang = %key.lang, "Forecast cache hit");
                return DailyForecast::new(&key, entry.text, ForecastOrigin::Cached);
            }
        }

        tracing::info!(sign = %key.sign, lang = %key.lang, date = %key.date, "Forecast cache miss");
        match self.shared_fetch(&key, sign).await {
            Some(text) => DailyForecast::new(&key, text, ForecastOrigin::Live),
            None => {
                let text = self.fallbacks.pick(language, key.date);
                DailyForecast::new(&key, text, ForecastOrigin::Fallback)
            }
        }
    }

    /// Empties the slot.
    pub async fn clear_cache(&self) {
        *self.slot.write().await = None;
        if let Err(e) = self.store.delete(StorageKey::ForecastCache).await {
            tracing::warn!("Failed to delete forecast cache: {}", e);
        }
    }

    /// Drops the in-memory copy so the next lookup re-reads the store.
    pub async fn forget(&self) {
        *self.slot.write().await = None;
    }

    async fn cached_entry(&self) -> Option<ForecastCacheEntry> {
        if let Some(entry) = self.slot.read().await.as_ref() {
            return Some(entry.clone());
        }

        match load_typed::<ForecastCacheEntry>(self.store.as_ref(), StorageKey::ForecastCache).await {
            Ok(stored) => {
                if let Some(entry) = &stored {
                    *self.slot.write().await = Some(entry.clone());
                }
                stored
            }
            Err(e) => {
                tracing::warn!("Failed to read forecast cache, treating as miss: {}", e);
                None
            }
        }
    }

    fn shared_fetch(&self, key: &ForecastKey, sign: ForecastSign) -> SharedFetch {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = in_flight.get(key) {
            tracing::debug!(sign = %key.sign, "Joining in-flight forecast fetch");
            return existing.clone();
        }

        let fetch = fetch_and_store(
            key.clone(),
            sign,
            self.fetcher.clone(),
            self.store.clone(),
            self.slot.clone(),
            self.in_flight.clone(),
        )
        .boxed()
        .shared();
        in_flight.insert(key.clone(), fetch.clone());
        fetch
    }
}

async fn fetch_and_store(
    key: ForecastKey,
    sign: ForecastSign,
    fetcher: Arc<dyn ForecastFetcher>,
    store: Arc<dyn KeyValueStore>,
    slot: Arc<RwLock<Option<ForecastCacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<ForecastKey, SharedFetch>>>,
) -> Option<String> {
    let text = match fetcher.fetch(sign, key.lang).await {
        Ok(Some(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            tracing::warn!(sign = %key.sign, lang = %key.lang, "No live forecast available");
            None
        }
        Err(e) => {
            tracing::error!(sign = %key.sign, lang = %key.lang, "Forecast fetch failed: {}", e);
            None
        }
    };

    if let Some(text) = &text {
        let entry = ForecastCacheEntry::new(&key, text.as_str());
        if let Err(e) = save_typed(store.as_ref(), StorageKey::ForecastCache, &entry).await {
            tracing::warn!("Failed to persist forecast cache, keeping it in memory: {}", e);
        }
        *slot.write().await = Some(entry);
    }

    in_flight
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(&key);
    text
}

impl std::fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCache").finish_non_exhaustive()
    }
}
