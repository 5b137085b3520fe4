//! Application layer for AstroAI.
//!
//! Use cases that coordinate the domain types in `astroai-core` with the
//! storage and HTTP collaborators, plus the screen flows the UI drives.

pub mod flows;
pub mod forecast_service;
pub mod history_service;
pub mod navigation_controller;
pub mod profile_service;
pub mod prompts;
pub mod reading_service;
pub mod settings_service;
pub mod startup;

pub use flows::{ScreenFlows, Services};
pub use forecast_service::ForecastCache;
pub use history_service::HistoryService;
pub use navigation_controller::{NavigationController, RequestTicket};
pub use profile_service::{ProfileService, SaveOutcome};
pub use prompts::Prompts;
pub use reading_service::{ModelChoice, ReadingService};
pub use settings_service::SettingsService;
pub use startup::StartupRouter;
