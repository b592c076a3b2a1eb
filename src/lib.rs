//! Concurrency-safe rotating selection over pools of interchangeable values
//! (API keys, provider endpoints), skipping failed and throttled entries.

pub mod config;
pub mod observability;
pub mod resilience;
pub mod rotation;

pub use config::RegistryConfig;
pub use rotation::{Candidate, Pool, PoolRegistry, PoolStats};
