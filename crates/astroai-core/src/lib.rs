//! Domain layer of AstroAI.
//!
//! Pure logic and the traits the outer layers plug into: the navigation
//! state machine, the profile gate, AI response normalization, forecast
//! keys and the key-value store abstraction.

pub mod clock;
pub mod config;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod history;
pub mod language;
pub mod navigation;
pub mod notification;
pub mod reading;
pub mod storage;
pub mod user;

// Re-export common error type
pub use error::{AstroError, Result};
