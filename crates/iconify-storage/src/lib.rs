//! In-memory icon storage for the Iconify engine.
//!
//! Icons are kept per provider and prefix. Each [`IconStorage`] tracks
//! which names are loaded, known to be missing, or waiting for the API.

mod registry;
mod storage;

pub use registry::IconRegistry;
pub use storage::IconStorage;
