use chrono::{DateTime, Duration, Local};

/// Window in which a second root back press exits the app.
pub const DEFAULT_EXIT_WINDOW_MS: i64 = 2_000;

/// What to do with a back press on the root screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Let the platform close the app.
    Exit,
    /// Swallow the press and hint that another one exits.
    Suppress,
}

/// Double-press-to-exit guard for the root screen.
#[derive(Debug, Clone)]
pub struct RootExitGuard {
    window: Duration,
    last_press: Option<DateTime<Local>>,
}

impl Default for RootExitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_WINDOW_MS)
    }
}

impl RootExitGuard {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window: Duration::milliseconds(window_ms),
            last_press: None,
        }
    }

    /// Registers a root back press at `now`.
    ///
    /// Exits only when the previous press is strictly less than the window
    /// ago; the window boundary itself suppresses.
    pub fn on_root_back(&mut self, now: DateTime<Local>) -> ExitDecision {
        match self.last_press {
            Some(last) if now - last < self.window => {
                self.last_press = None;
                ExitDecision::Exit
            }
            _ => {
                self.last_press = Some(now);
                ExitDecision::Suppress
            }
        }
    }

    pub fn last_press(&self) -> Option<DateTime<Local>> {
        self.last_press
    }
}
