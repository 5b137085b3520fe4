//! Persistent key-value store abstraction.
//!
//! The store is a flat namespace of independent JSON values. Each
//! [`StorageKey`] has exactly one owning service; no two services write the
//! same key.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tokio::sync::RwLock;

use crate::error::Result;

/// Logical keys of the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum StorageKey {
    Profile,
    PalmHistory,
    TarotHistory,
    ChatHistory,
    Language,
    ForecastCache,
    DisclaimerAccepted,
}

/// Flat JSON key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>>;

    async fn set(&self, key: StorageKey, value: Value) -> Result<()>;

    async fn delete(&self, key: StorageKey) -> Result<()>;

    /// Removes every key ("delete my data").
    async fn clear_all(&self) -> Result<()>;
}

/// Reads `key` and deserializes it into `T`.
///
/// A value that no longer matches `T` is reported as a serialization error
/// rather than silently dropped, so callers can decide whether to log it.
pub async fn load_typed<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StorageKey,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes `value` and writes it under `key`.
pub async fn save_typed<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StorageKey,
    value: &T,
) -> Result<()> {
    store.set(key, serde_json::to_value(value)?).await
}

/// In-memory store. Used in tests and as the degraded mode when the file
/// store cannot be opened.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<StorageKey, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: StorageKey, value: Value) -> Result<()> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: StorageKey) -> Result<()> {
        self.entries.write().await.remove(&key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::ChatHistory.as_ref(), "chat-history");
        assert_eq!(StorageKey::ForecastCache.to_string(), "forecast-cache");
        assert_eq!(
            "disclaimer-accepted".parse::<StorageKey>().unwrap(),
            StorageKey::DisclaimerAccepted
        );
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryStore::new();
        assert!(store.get(StorageKey::Language).await.unwrap().is_none());

        store.set(StorageKey::Language, json!("hi")).await.unwrap();
        assert_eq!(
            store.get(StorageKey::Language).await.unwrap(),
            Some(json!("hi"))
        );

        store.delete(StorageKey::Language).await.unwrap();
        assert!(store.get(StorageKey::Language).await.unwrap().is_none());

        store.set(StorageKey::Profile, json!({})).await.unwrap();
        store.set(StorageKey::Language, json!("en")).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let store = MemoryStore::new();
        save_typed(&store, StorageKey::DisclaimerAccepted, &true)
            .await
            .unwrap();
        let accepted: Option<bool> = load_typed(&store, StorageKey::DisclaimerAccepted)
            .await
            .unwrap();
        assert_eq!(accepted, Some(true));

        store
            .set(StorageKey::DisclaimerAccepted, json!("not a bool"))
            .await
            .unwrap();
        let result: Result<Option<bool>> = load_typed(&store, StorageKey::DisclaimerAccepted).await;
        assert!(result.is_err());
    }
}
