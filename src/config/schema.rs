//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for a pool registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Group that empty keys resolve to.
    pub default_key: String,

    /// Sleep between attempts when waiting for a candidate, in milliseconds.
    pub poll_interval_ms: u64,

    /// Hold durations applied to throttled candidates.
    pub hold: HoldConfig,

    /// Groups and their initial members.
    pub groups: Vec<GroupConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_key: "default".to_string(),
            poll_interval_ms: 100,
            hold: HoldConfig::default(),
            groups: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl RegistryConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// A group of interchangeable values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupConfig {
    /// Group key; empty means the default group.
    #[serde(default)]
    pub key: String,

    /// Values to append, in order.
    #[serde(default)]
    pub members: Vec<String>,
}

/// Hold backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HoldConfig {
    /// Hold for the first throttle, in milliseconds.
    pub base_ms: u64,

    /// Upper bound for any single hold, in milliseconds.
    pub max_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            base_ms: 1_000,
            max_ms: 60_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when RUST_LOG is not set.
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
