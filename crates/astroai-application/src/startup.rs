//! Initial routing after the splash screen.

use std::sync::Mutex;
use std::time::Duration;

use astroai_core::user::{GateLatch, InitialRoute, ProfileLoad, UserProfile};

use crate::profile_service::ProfileService;

/// Loads the profile with a bounded wait and decides, once, where the app
/// goes after the splash.
#[derive(Debug)]
pub struct StartupRouter {
    latch: Mutex<GateLatch>,
    timeout: Duration,
}

impl StartupRouter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            latch: Mutex::new(GateLatch::new()),
            timeout,
        }
    }

    /// Returns the route to take, or `None` if a route was already taken.
    ///
    /// A load slower than the timeout is treated as a new user.
    pub async fn route(&self, profiles: &ProfileService) -> Option<InitialRoute> {
        let loaded: Option<UserProfile> = match tokio::time::timeout(self.timeout, profiles.load()).await {
            Ok(profile) => Some(profile),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Profile load timed out, continuing as new user"
                );
                None
            }
        };

        let load = match &loaded {
            Some(profile) => ProfileLoad::Loaded(profile),
            None => ProfileLoad::TimedOut,
        };
        let route = self
            .latch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .offer(load);

        if let Some(route) = route {
            tracing::info!(?route, "Initial route decided");
        }
        route
    }

    pub fn fired(&self) -> Option<InitialRoute> {
        self.latch.lock().unwrap_or_else(|e| e.into_inner()).fired()
    }
}
