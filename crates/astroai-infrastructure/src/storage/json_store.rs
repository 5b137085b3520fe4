//! File-backed key-value store.

use astroai_core::error::Result;
use astroai_core::storage::{KeyValueStore, StorageKey};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::atomic_file::AtomicFile;

type Document = Map<String, Value>;

/// All keys in one JSON document (`store.json`).
///
/// The document is read once and cached; every write goes through a locked
/// atomic update of the file before the cache is replaced.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    file: Arc<AtomicFile<Document>>,
    cache: Arc<RwLock<Option<Document>>>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicFile::json(path)),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    async fn document(&self) -> Result<Document> {
        {
            let cached = self.cache.read().await;
            if let Some(doc) = cached.as_ref() {
                return Ok(doc.clone());
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(doc) = cache.as_ref() {
            return Ok(doc.clone());
        }
        let loaded = self.file.load()?.unwrap_or_default();
        tracing::debug!(path = %self.file.path().display(), keys = loaded.len(), "Loaded key-value store");
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    async fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Document),
    {
        let mut cache = self.cache.write().await;
        let written = self.file.update(Document::new(), |doc| {
            f(doc);
            Ok(())
        })?;
        *cache = Some(written);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>> {
        Ok(self.document().await?.get(key.as_ref()).cloned())
    }

    async fn set(&self, key: StorageKey, value: Value) -> Result<()> {
        self.modify(|doc| {
            doc.insert(key.to_string(), value);
        })
        .await
    }

    async fn delete(&self, key: StorageKey) -> Result<()> {
        self.modify(|doc| {
            doc.remove(key.as_ref());
        })
        .await
    }

    async fn clear_all(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        self.file.remove()?;
        *cache = Some(Document::new());
        tracing::info!(path = %self.file.path().display(), "Cleared key-value store");
        Ok(())
    }
}
