//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: the profile and its setup form
//! - `zodiac`: sign derivation, western and Vedic
//! - `gate`: initial routing from the profile state

mod gate;
mod model;
mod zodiac;

// Re-export public API
pub use gate::{GateLatch, InitialRoute, ProfileGate, ProfileLoad};
pub use model::{Gender, ProfileDraft, UserProfile};
pub use zodiac::{Element, Rashi, ZodiacSign};
