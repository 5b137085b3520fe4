//! File persistence primitives.

mod atomic_file;
mod json_store;

pub use atomic_file::{AtomicFile, FileFormat};
pub use json_store::JsonFileStore;
