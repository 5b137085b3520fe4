use std::sync::Arc;

use astroai_application::{NavigationController, ScreenFlows};
use astroai_core::config::AppConfig;
use astroai_infrastructure::AstroPaths;

/// Everything the UI layer holds on to for the lifetime of the app.
pub struct AppState {
    pub paths: AstroPaths,
    pub config: AppConfig,
    pub flows: Arc<ScreenFlows>,
}

impl AppState {
    pub fn controller(&self) -> &Arc<NavigationController> {
        self.flows.controller()
    }
}
