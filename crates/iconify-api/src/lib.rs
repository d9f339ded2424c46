//! Icon loading for the Iconify engine.
//!
//! This crate provides:
//! - API provider configuration ([`ApiConfig`])
//! - The transport seam ([`ApiModule`]) and query splitting
//! - Host rotation with timeouts ([`send_query`])
//! - The loading coordinator with batched queries and subscriptions ([`ApiLoader`])
//! - A deterministic [`ManualScheduler`] for driving all of the above in tests
//!
//! Everything runs on one thread. Work is deferred through a [`Scheduler`],
//! so results are never delivered synchronously.

mod callbacks;
mod config;
mod loader;
mod modules;
mod redundancy;
mod scheduler;

pub use callbacks::{AbortHandle, LoadCallback, LoadUpdate};
pub use config::{ApiConfig, DEFAULT_API_HOSTS};
pub use loader::ApiLoader;
pub use modules::{ApiModule, ApiProviders, ApiQuery, QueryResponse, Responder};
pub use redundancy::{send_query, QueryHandle, QueryOutcome, QueryStatus};
pub use scheduler::{ManualScheduler, Scheduler, Task};
