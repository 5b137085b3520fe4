//! History Service
//!
//! Owns the `palm-history`, `tarot-history` and `chat-history` keys. Each
//! list is stored newest first and capped; the chat list doubles as the
//! persisted chat transcript.

use std::sync::Arc;

use astroai_core::config::Limits;
use astroai_core::history::{HistoryEntry, HistoryKind, push_newest_first};
use astroai_core::reading::ChatMessage;
use astroai_core::storage::{KeyValueStore, load_typed, save_typed};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::IntoEnumIterator;

pub struct HistoryService {
    store: Arc<dyn KeyValueStore>,
    history_cap: usize,
    transcript_cap: usize,
    enabled: bool,
}

impl HistoryService {
    /// `enabled` mirrors the `save_history_locally` feature flag.
    pub fn new(store: Arc<dyn KeyValueStore>, limits: &Limits, enabled: bool) -> Self {
        Self {
            store,
            history_cap: limits.history_cap,
            transcript_cap: limits.chat_transcript_cap,
            enabled,
        }
    }

    fn cap_for(&self, kind: HistoryKind) -> usize {
        match kind {
            HistoryKind::Chat => self.transcript_cap,
            HistoryKind::Palm | HistoryKind::Tarot => self.history_cap,
        }
    }

    /// Prepends `record` to the `kind` list, evicting the oldest entries
    /// past the cap. Returns the stored entry, or `None` when history is
    /// disabled or the write failed.
    pub async fn append<T>(&self, kind: HistoryKind, record: T) -> Option<HistoryEntry<T>>
    where
        T: Serialize + Send + Sync,
    {
        if !self.enabled {
            tracing::debug!(%kind, "Local history disabled, not saving");
            return None;
        }

        let entry = HistoryEntry::new(record);
        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%kind, "Failed to serialize history entry: {}", e);
                return None;
            }
        };

        let mut list = self.raw_list(kind).await;
        push_newest_first(&mut list, value, self.cap_for(kind));

        match save_typed(self.store.as_ref(), kind.storage_key(), &list).await {
            Ok(()) => {
                tracing::debug!(%kind, len = list.len(), "History entry saved");
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(%kind, "Failed to save history: {}", e);
                None
            }
        }
    }

    /// Entries of `kind`, newest first. Entries that no longer decode as
    /// `T` are skipped.
    pub async fn list<T: DeserializeOwned>(&self, kind: HistoryKind) -> Vec<HistoryEntry<T>> {
        self.raw_list(kind)
            .await
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(%kind, "Skipping unreadable history entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// The persisted chat, oldest message first.
    pub async fn chat_transcript(&self) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .list::<ChatMessage>(HistoryKind::Chat)
            .await
            .into_iter()
            .map(|entry| entry.record)
            .collect();
        messages.reverse();
        messages
    }

    pub async fn clear(&self, kind: HistoryKind) {
        if let Err(e) = self.store.delete(kind.storage_key()).await {
            tracing::warn!(%kind, "Failed to clear history: {}", e);
        }
    }

    pub async fn clear_all(&self) {
        for kind in HistoryKind::iter() {
            self.clear(kind).await;
        }
    }

    async fn raw_list(&self, kind: HistoryKind) -> Vec<Value> {
        match load_typed::<Vec<Value>>(self.store.as_ref(), kind.storage_key()).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(%kind, "Failed to read history, treating as empty: {}", e);
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryService")
            .field("history_cap", &self.history_cap)
            .field("transcript_cap", &self.transcript_cap)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
