//! Persistence for AstroAI: file locations, the JSON key-value store and
//! the configuration files.

pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::{AstroPaths, ServiceType};
pub use secret_service::{ApiKeys, SecretService};
pub use storage::{AtomicFile, FileFormat, JsonFileStore};
