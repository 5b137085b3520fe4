use super::model::UserProfile;
use crate::navigation::ScreenId;

/// State of the persisted profile at the moment of a routing decision.
#[derive(Debug, Clone, Copy)]
pub enum ProfileLoad<'a> {
    Loading,
    /// The bounded wait expired before storage answered.
    TimedOut,
    Loaded(&'a UserProfile),
}

/// Where the app goes after the splash screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialRoute {
    StayOnSplash,
    /// New user: language picker, then onboarding.
    LanguageThenOnboarding,
    Home,
}

impl InitialRoute {
    /// Screen to open, if any.
    pub fn target(&self) -> Option<ScreenId> {
        match self {
            InitialRoute::StayOnSplash => None,
            InitialRoute::LanguageThenOnboarding => Some(ScreenId::Language),
            InitialRoute::Home => Some(ScreenId::Home),
        }
    }
}

/// Decides the initial route from the profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileGate;

impl ProfileGate {
    pub fn decide(load: ProfileLoad<'_>) -> InitialRoute {
        match load {
            ProfileLoad::Loading => InitialRoute::StayOnSplash,
            ProfileLoad::TimedOut => InitialRoute::LanguageThenOnboarding,
            ProfileLoad::Loaded(profile) if profile.onboarding_complete() => InitialRoute::Home,
            ProfileLoad::Loaded(_) => InitialRoute::LanguageThenOnboarding,
        }
    }
}

/// Lets the gate navigate at most once per app start.
#[derive(Debug, Default)]
pub struct GateLatch {
    fired: Option<InitialRoute>,
}

impl GateLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the route to take, or `None` if still loading or a route was
    /// already taken.
    pub fn offer(&mut self, load: ProfileLoad<'_>) -> Option<InitialRoute> {
        if self.fired.is_some() {
            return None;
        }
        match ProfileGate::decide(load) {
            InitialRoute::StayOnSplash => None,
            route => {
                self.fired = Some(route);
                Some(route)
            }
        }
    }

    pub fn fired(&self) -> Option<InitialRoute> {
        self.fired
    }
}
