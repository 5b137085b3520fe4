use chrono::{DateTime, Local};

use super::backend::HistoryBackend;
use super::exit_guard::{ExitDecision, RootExitGuard};
use super::model::{ScreenId, ScreenParams, ScreenState};

/// Result of a system back gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// One level was popped.
    Popped { to: ScreenId },
    /// At the root; the press was swallowed and the user should be hinted.
    ExitSuppressed,
    /// At the root, second press inside the window; the platform may exit.
    ExitAllowed,
}

/// In-memory navigation state machine synchronized with a
/// [`HistoryBackend`].
pub struct Navigator {
    state: ScreenState,
    backend: Box<dyn HistoryBackend>,
    exit_guard: RootExitGuard,
    generation: u64,
}

impl Navigator {
    pub fn new(backend: Box<dyn HistoryBackend>, exit_guard: RootExitGuard) -> Self {
        Self {
            state: ScreenState::default(),
            backend,
            exit_guard,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn current_screen(&self) -> ScreenId {
        self.state.current_screen
    }

    pub fn params(&self) -> Option<&ScreenParams> {
        self.state.params.as_ref()
    }

    pub fn history_stack(&self) -> &[ScreenId] {
        &self.state.history_stack
    }

    /// Bumped on every transition.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Opens `screen`, stacking the current one unless it is the splash.
    pub fn navigate(&mut self, screen: ScreenId, params: Option<ScreenParams>) {
        let from = self.state.current_screen;
        if from != ScreenId::Splash {
            self.state.history_stack.push(from);
            self.backend.push_entry(screen);
        } else {
            self.backend.replace_entry(screen);
        }

        self.state.current_screen = screen;
        self.state.params = params;
        self.backend.scroll_to_top();
        self.bump();

        tracing::info!(
            from = %from,
            to = %screen,
            depth = self.state.history_stack.len(),
            "Navigated"
        );
    }

    /// Returns to the previous screen. Returns `false` on an empty stack.
    pub fn go_back(&mut self) -> bool {
        match self.state.history_stack.pop() {
            Some(previous) => {
                self.backend.back();
                self.land_on(previous);
                true
            }
            None => {
                tracing::debug!("Root screen reached");
                false
            }
        }
    }

    /// Clears the stack and lands on home.
    pub fn reset_navigation(&mut self) {
        self.replace_root(ScreenId::Home);
    }

    /// Clears the stack and makes `screen` the only entry, so a back
    /// gesture from it reaches the exit guard.
    pub fn replace_root(&mut self, screen: ScreenId) {
        self.state.history_stack.clear();
        self.state.current_screen = screen;
        self.state.params = None;
        self.backend.reset();
        self.backend.replace_entry(screen);
        self.backend.scroll_to_top();
        self.bump();
        tracing::info!(root = %screen, "Navigation reset to {}", screen);
    }

    /// Handles a system back gesture after the backend already dropped its
    /// top entry. `landed_on` is the entry the backend now shows, if known.
    ///
    /// Exactly one level is popped per gesture. The in-memory stack is
    /// authoritative when the backend disagrees.
    pub fn handle_back_gesture(
        &mut self,
        landed_on: Option<ScreenId>,
        now: DateTime<Local>,
    ) -> BackOutcome {
        match self.state.history_stack.pop() {
            Some(previous) => {
                if let Some(landed) = landed_on {
                    if landed != previous {
                        tracing::warn!(
                            backend = %landed,
                            stack = %previous,
                            "History backend out of step, using in-memory stack"
                        );
                    }
                }
                self.land_on(previous);
                BackOutcome::Popped { to: previous }
            }
            None => match self.exit_guard.on_root_back(now) {
                ExitDecision::Exit => {
                    tracing::info!("Second back press at root, allowing exit");
                    BackOutcome::ExitAllowed
                }
                ExitDecision::Suppress => {
                    // Re-arm the backend so the next press reaches us again.
                    self.backend.push_entry(self.state.current_screen);
                    BackOutcome::ExitSuppressed
                }
            },
        }
    }

    /// Repairs a backend that holds entries the in-memory stack does not
    /// know about (e.g. after a reload). Returns `true` when it acted.
    pub fn recover(&mut self) -> bool {
        let depth = self.backend.depth();
        if !self.state.history_stack.is_empty() || depth == 0 {
            return false;
        }

        tracing::warn!(depth, screen = %self.state.current_screen, "Recovering desynchronized history");
        self.backend.reset();
        self.backend.replace_entry(self.state.current_screen);
        true
    }

    fn land_on(&mut self, screen: ScreenId) {
        self.state.current_screen = screen;
        self.state.params = None;
        self.bump();
        tracing::info!(to = %screen, depth = self.state.history_stack.len(), "Navigated back");
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::backend::{HistoryEvent, InMemoryHistory};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn navigator() -> (Navigator, InMemoryHistory) {
        let history = InMemoryHistory::new();
        let nav = Navigator::new(Box::new(history.clone()), RootExitGuard::default());
        (nav, history)
    }

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_splash_is_never_stacked() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Home, None);
        assert!(nav.history_stack().is_empty());
        assert_eq!(history.depth(), 0);
        assert_eq!(history.top(), Some(ScreenId::Home));
    }

    #[test]
    fn test_navigate_then_back_is_balanced() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Home, None);
        let start_screen = nav.current_screen();
        let start_len = nav.history_stack().len();

        let route = [
            ScreenId::Tarot,
            ScreenId::TarotReading,
            ScreenId::History,
            ScreenId::Settings,
            ScreenId::PrivacyPolicy,
        ];
        for screen in route {
            nav.navigate(screen, None);
        }
        assert_eq!(history.depth(), route.len());

        for _ in route {
            assert!(nav.go_back());
        }
        assert_eq!(nav.current_screen(), start_screen);
        assert_eq!(nav.history_stack().len(), start_len);
        assert_eq!(history.depth(), 0);
    }

    #[test]
    fn test_go_back_clears_params_and_is_noop_at_root() {
        let (mut nav, _history) = navigator();
        nav.navigate(ScreenId::Home, None);
        let mut params = ScreenParams::new();
        params.insert("category".into(), json!("love"));
        nav.navigate(ScreenId::TarotReading, Some(params));
        assert!(nav.params().is_some());

        assert!(nav.go_back());
        assert!(nav.params().is_none());

        let generation = nav.generation();
        assert!(!nav.go_back());
        assert_eq!(nav.current_screen(), ScreenId::Home);
        assert_eq!(nav.generation(), generation);
    }

    #[test]
    fn test_reset_navigation_replaces_entry() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Language, None);
        nav.navigate(ScreenId::Onboarding, None);
        nav.navigate(ScreenId::ProfileSetup, None);

        nav.reset_navigation();
        assert_eq!(nav.current_screen(), ScreenId::Home);
        assert!(nav.history_stack().is_empty());
        assert_eq!(history.depth(), 0);
        assert_eq!(history.events().last(), Some(&HistoryEvent::Replace(ScreenId::Home)));
    }

    #[test]
    fn test_replace_root_leaves_nothing_to_pop() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Home, None);
        nav.navigate(ScreenId::Settings, None);

        nav.replace_root(ScreenId::Language);
        assert_eq!(nav.current_screen(), ScreenId::Language);
        assert!(nav.history_stack().is_empty());
        assert_eq!(history.depth(), 0);
        assert_eq!(history.top(), Some(ScreenId::Language));
        assert!(!nav.go_back());

        let outcome = nav.handle_back_gesture(history.pop(), t0());
        assert_eq!(outcome, BackOutcome::ExitSuppressed);
        assert_eq!(nav.current_screen(), ScreenId::Language);
    }

    #[test]
    fn test_back_gesture_pops_one_level() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Home, None);
        nav.navigate(ScreenId::Horoscope, None);
        nav.navigate(ScreenId::HoroscopeDetail, None);

        let landed = history.pop();
        assert_eq!(
            nav.handle_back_gesture(landed, t0()),
            BackOutcome::Popped {
                to: ScreenId::Horoscope
            }
        );
        assert_eq!(nav.history_stack(), &[ScreenId::Home]);
    }

    #[test]
    fn test_back_gesture_prefers_in_memory_stack() {
        let (mut nav, _history) = navigator();
        nav.navigate(ScreenId::Home, None);
        nav.navigate(ScreenId::Chat, None);

        let outcome = nav.handle_back_gesture(Some(ScreenId::Settings), t0());
        assert_eq!(outcome, BackOutcome::Popped { to: ScreenId::Home });
        assert_eq!(nav.current_screen(), ScreenId::Home);
    }

    #[test]
    fn test_root_double_press() {
        let (mut nav, history) = navigator();
        nav.navigate(ScreenId::Home, None);

        let first = nav.handle_back_gesture(history.pop(), t0());
        assert_eq!(first, BackOutcome::ExitSuppressed);
        assert_eq!(history.depth(), 1);
        assert_eq!(nav.current_screen(), ScreenId::Home);

        let second = nav.handle_back_gesture(history.pop(), t0() + Duration::milliseconds(900));
        assert_eq!(second, BackOutcome::ExitAllowed);
    }

    #[test]
    fn test_recover_after_reload() {
        let history = InMemoryHistory::with_entries(&[ScreenId::Home, ScreenId::Tarot]);
        let mut nav = Navigator::new(Box::new(history.clone()), RootExitGuard::default());

        assert!(nav.recover());
        assert_eq!(history.depth(), 0);
        assert_eq!(history.top(), Some(ScreenId::Splash));
        assert!(!nav.recover());
    }

    #[test]
    fn test_generation_advances_on_transitions() {
        let (mut nav, _history) = navigator();
        let g0 = nav.generation();
        nav.navigate(ScreenId::Home, None);
        nav.navigate(ScreenId::Chat, None);
        nav.go_back();
        nav.reset_navigation();
        assert_eq!(nav.generation(), g0 + 4);
    }
}
