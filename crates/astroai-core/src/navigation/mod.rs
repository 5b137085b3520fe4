//! Screen navigation.
//!
//! # Module Structure
//!
//! - `model`: screen identifiers and the navigation state snapshot
//! - `backend`: the platform history collaborator
//! - `exit_guard`: double-press-to-exit timing at the root
//! - `navigator`: the state machine tying them together

mod backend;
mod exit_guard;
mod model;
mod navigator;

pub use backend::{HistoryBackend, HistoryEvent, InMemoryHistory};
pub use exit_guard::{DEFAULT_EXIT_WINDOW_MS, ExitDecision, RootExitGuard};
pub use model::{ScreenId, ScreenParams, ScreenState};
pub use navigator::{BackOutcome, Navigator};
