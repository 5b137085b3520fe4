pub mod bootstrap;
pub mod state;

pub use bootstrap::bootstrap;
pub use state::AppState;
