//! Navigation Controller
//!
//! Wraps the [`Navigator`] for use from async flows and tracks the one
//! outstanding request per screen. A request is represented by a
//! [`RequestTicket`]; any screen transition cancels it, so results that
//! arrive after the user moved on are recognised as stale and dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use astroai_core::clock::Clock;
use astroai_core::navigation::{BackOutcome, Navigator, ScreenId, ScreenParams, ScreenState};
use astroai_core::notification::{Notifier, Toast};
use tokio_util::sync::CancellationToken;

pub const EXIT_HINT: &str = "Press back again to exit";

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    screen: ScreenId,
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancelled as soon as the user leaves the screen.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[derive(Debug, Default)]
struct RequestTracker {
    next_id: u64,
    outstanding: Option<RequestTicket>,
}

impl RequestTracker {
    fn cancel_outstanding(&mut self) {
        if let Some(ticket) = self.outstanding.take() {
            tracing::debug!(screen = %ticket.screen, id = ticket.id, "Cancelling outstanding request");
            ticket.token.cancel();
        }
    }
}

#[derive(Debug)]
struct ControllerState {
    navigator: Navigator,
    tracker: RequestTracker,
}

pub struct NavigationController {
    state: Mutex<ControllerState>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl NavigationController {
    pub fn new(navigator: Navigator, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                navigator,
                tracker: RequestTracker::default(),
            }),
            notifier,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current_screen(&self) -> ScreenId {
        self.lock().navigator.current_screen()
    }

    pub fn params(&self) -> Option<ScreenParams> {
        self.lock().navigator.params().cloned()
    }

    pub fn history_stack(&self) -> Vec<ScreenId> {
        self.lock().navigator.history_stack().to_vec()
    }

    pub fn snapshot(&self) -> ScreenState {
        self.lock().navigator.state().clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().navigator.generation()
    }

    pub fn navigate(&self, screen: ScreenId, params: Option<ScreenParams>) {
        let mut state = self.lock();
        state.tracker.cancel_outstanding();
        state.navigator.navigate(screen, params);
    }

    pub fn go_back(&self) -> bool {
        let mut state = self.lock();
        state.tracker.cancel_outstanding();
        state.navigator.go_back()
    }

    pub fn reset_navigation(&self) {
        let mut state = self.lock();
        state.tracker.cancel_outstanding();
        state.navigator.reset_navigation();
    }

    /// Makes `screen` the only entry on the stack.
    pub fn replace_root(&self, screen: ScreenId) {
        let mut state = self.lock();
        state.tracker.cancel_outstanding();
        state.navigator.replace_root(screen);
    }

    /// System back gesture. At the root the first press only shows a hint.
    pub fn back_gesture(&self, landed_on: Option<ScreenId>) -> BackOutcome {
        let outcome = {
            let mut state = self.lock();
            let outcome = state.navigator.handle_back_gesture(landed_on, self.clock.now());
            if matches!(outcome, BackOutcome::Popped { .. }) {
                state.tracker.cancel_outstanding();
            }
            outcome
        };

        if outcome == BackOutcome::ExitSuppressed {
            self.notifier.notify(Toast::info(EXIT_HINT).with_duration(2_000));
        }
        outcome
    }

    pub fn recover(&self) -> bool {
        self.lock().navigator.recover()
    }

    /// Starts a request for the active screen, or returns `None` while one
    /// is already running there.
    pub fn begin_request(&self) -> Option<RequestTicket> {
        let mut state = self.lock();
        let screen = state.navigator.current_screen();
        let generation = state.navigator.generation();

        if let Some(running) = &state.tracker.outstanding {
            if !running.token.is_cancelled() && running.generation == generation {
                tracing::debug!(%screen, "Request already in progress, ignoring");
                return None;
            }
        }

        state.tracker.next_id += 1;
        let ticket = RequestTicket {
            id: state.tracker.next_id,
            screen,
            generation,
            token: CancellationToken::new(),
        };
        state.tracker.outstanding = Some(ticket.clone());
        Some(ticket)
    }

    /// Releases `ticket` so the screen can issue another request.
    pub fn finish_request(&self, ticket: &RequestTicket) {
        let mut state = self.lock();
        if state
            .tracker
            .outstanding
            .as_ref()
            .is_some_and(|running| running.id == ticket.id)
        {
            state.tracker.outstanding = None;
        }
    }

    /// True while the user is still on the screen that issued `ticket`.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let state = self.lock();
        !ticket.token.is_cancelled()
            && state.navigator.generation() == ticket.generation
            && state.navigator.current_screen() == ticket.screen
    }

    pub fn notify(&self, toast: Toast) {
        self.notifier.notify(toast);
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astroai_core::clock::ManualClock;
    use astroai_core::navigation::{InMemoryHistory, RootExitGuard};
    use astroai_core::notification::{RecordingNotifier, ToastKind};
    use chrono::{Local, TimeZone};

    struct Fixture {
        controller: NavigationController,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
        history: InMemoryHistory,
    }

    fn fixture() -> Fixture {
        let history = InMemoryHistory::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap(),
        ));
        let navigator = Navigator::new(Box::new(history.clone()), RootExitGuard::default());
        Fixture {
            controller: NavigationController::new(navigator, notifier.clone(), clock.clone()),
            notifier,
            clock,
            history,
        }
    }

    #[test]
    fn test_double_tap_is_ignored() {
        let f = fixture();
        f.controller.navigate(ScreenId::Home, None);
        f.controller.navigate(ScreenId::Tarot, None);

        let ticket = f.controller.begin_request().unwrap();
        assert!(f.controller.begin_request().is_none());

        f.controller.finish_request(&ticket);
        assert!(f.controller.begin_request().is_some());
    }

    #[test]
    fn test_navigation_makes_ticket_stale() {
        let f = fixture();
        f.controller.navigate(ScreenId::Home, None);
        f.controller.navigate(ScreenId::Horoscope, None);

        let ticket = f.controller.begin_request().unwrap();
        assert!(f.controller.is_current(&ticket));

        f.controller.go_back();
        assert!(ticket.token().is_cancelled());
        assert!(!f.controller.is_current(&ticket));

        f.controller.navigate(ScreenId::Horoscope, None);
        assert!(!f.controller.is_current(&ticket));
        assert!(f.controller.begin_request().is_some());
    }

    #[test]
    fn test_root_back_shows_hint_once_per_window() {
        let f = fixture();
        f.controller.navigate(ScreenId::Home, None);

        assert_eq!(f.controller.back_gesture(None), BackOutcome::ExitSuppressed);
        let toasts = f.notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Info);
        assert_eq!(toasts[0].message, EXIT_HINT);

        f.clock.advance_millis(1_500);
        assert_eq!(f.controller.back_gesture(None), BackOutcome::ExitAllowed);
        assert_eq!(f.notifier.toasts().len(), 1);
    }

    #[test]
    fn test_replace_root_cancels_and_clears_stack() {
        let f = fixture();
        f.controller.navigate(ScreenId::Home, None);
        f.controller.navigate(ScreenId::Settings, None);
        let ticket = f.controller.begin_request().unwrap();

        f.controller.replace_root(ScreenId::Language);
        assert!(ticket.token().is_cancelled());
        assert_eq!(f.controller.current_screen(), ScreenId::Language);
        assert!(f.controller.history_stack().is_empty());
        assert_eq!(f.controller.back_gesture(None), BackOutcome::ExitSuppressed);
    }

    #[test]
    fn test_back_gesture_pops_and_cancels() {
        let f = fixture();
        f.controller.navigate(ScreenId::Home, None);
        f.controller.navigate(ScreenId::Chat, None);
        let ticket = f.controller.begin_request().unwrap();

        let landed = f.history.pop();
        assert_eq!(
            f.controller.back_gesture(landed),
            BackOutcome::Popped { to: ScreenId::Home }
        );
        assert!(ticket.token().is_cancelled());
        assert_eq!(f.controller.current_screen(), ScreenId::Home);
        assert!(f.notifier.toasts().is_empty());
    }
}
