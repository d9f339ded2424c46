//! Persistent icon cache for the Iconify engine.
//!
//! Icon sets returned by the API are written to key-value stores shaped
//! like `localStorage` and `sessionStorage`, and read back on startup.
//! The key layout is shared with other Iconify implementations:
//! `iconify-version`, `iconify-count` and one `iconify{N}` item per set.

mod cache;
mod store;

pub use cache::{BrowserCache, CacheConfig, CacheScope, CACHE_PREFIX, CACHE_VERSION};
pub use store::{KeyValueStore, MemoryStore};
