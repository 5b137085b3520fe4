use std::sync::{Arc, Mutex};

use super::model::ScreenId;

/// The platform's own history (the OS back stack, a browser history, ...).
///
/// The navigator keeps it in lockstep with its in-memory stack: one entry
/// per stacked screen on top of the base entry.
pub trait HistoryBackend: Send {
    /// Adds an entry on top.
    fn push_entry(&mut self, screen: ScreenId);

    /// Overwrites the top entry.
    fn replace_entry(&mut self, screen: ScreenId);

    /// Drops the top entry, as an in-app back button would.
    fn back(&mut self);

    fn scroll_to_top(&mut self);

    /// Entries above the base entry.
    fn depth(&self) -> usize;

    /// Discards every entry above the base entry.
    fn reset(&mut self);
}

/// Recorded call on an [`InMemoryHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Push(ScreenId),
    Replace(ScreenId),
    Back,
    ScrollToTop,
    Reset,
}

#[derive(Debug)]
struct Inner {
    entries: Vec<ScreenId>,
    events: Vec<HistoryEvent>,
}

/// History backend held entirely in memory.
///
/// Clones share the same entries, so a test can keep a handle while the
/// navigator owns another.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: vec![ScreenId::Splash],
                events: Vec::new(),
            })),
        }
    }

    /// A backend that already holds `entries` above the base, as after a
    /// page reload.
    pub fn with_entries(entries: &[ScreenId]) -> Self {
        let history = Self::new();
        history.lock().entries.extend_from_slice(entries);
        history
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Simulates the system back gesture: drops the top entry and returns
    /// the entry the platform lands on.
    pub fn pop(&self) -> Option<ScreenId> {
        let mut inner = self.lock();
        if inner.entries.len() > 1 {
            inner.entries.pop();
        }
        inner.entries.last().copied()
    }

    pub fn top(&self) -> Option<ScreenId> {
        self.lock().entries.last().copied()
    }

    pub fn entries(&self) -> Vec<ScreenId> {
        self.lock().entries.clone()
    }

    pub fn events(&self) -> Vec<HistoryEvent> {
        self.lock().events.clone()
    }
}

impl HistoryBackend for InMemoryHistory {
    fn push_entry(&mut self, screen: ScreenId) {
        let mut inner = self.lock();
        inner.entries.push(screen);
        inner.events.push(HistoryEvent::Push(screen));
    }

    fn replace_entry(&mut self, screen: ScreenId) {
        let mut inner = self.lock();
        if let Some(top) = inner.entries.last_mut() {
            *top = screen;
        }
        inner.events.push(HistoryEvent::Replace(screen));
    }

    fn back(&mut self) {
        let mut inner = self.lock();
        if inner.entries.len() > 1 {
            inner.entries.pop();
        }
        inner.events.push(HistoryEvent::Back);
    }

    fn scroll_to_top(&mut self) {
        self.lock().events.push(HistoryEvent::ScrollToTop);
    }

    fn depth(&self) -> usize {
        self.lock().entries.len().saturating_sub(1)
    }

    fn reset(&mut self) {
        let mut inner = self.lock();
        inner.entries.truncate(1);
        inner.events.push(HistoryEvent::Reset);
    }
}
