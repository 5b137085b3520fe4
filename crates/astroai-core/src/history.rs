//! Capped, newest-first reading history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::storage::StorageKey;

/// Default number of entries kept per history list.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Which history list a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HistoryKind {
    Palm,
    Tarot,
    Chat,
}

impl HistoryKind {
    pub fn storage_key(&self) -> StorageKey {
        match self {
            HistoryKind::Palm => StorageKey::PalmHistory,
            HistoryKind::Tarot => StorageKey::TarotHistory,
            HistoryKind::Chat => StorageKey::ChatHistory,
        }
    }
}

/// A stored record with its identity and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<T> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub record: T,
}

impl<T> HistoryEntry<T> {
    pub fn new(record: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            record,
        }
    }
}

/// Inserts `entry` at the front and drops the oldest entries beyond `cap`.
pub fn push_newest_first<T>(list: &mut Vec<T>, entry: T, cap: usize) {
    list.insert(0, entry);
    list.truncate(cap);
}
