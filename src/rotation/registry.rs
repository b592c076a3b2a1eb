//! Keyed pool registry.
//!
//! # Responsibilities
//! - Group pools by a string key (tenant, provider, ...)
//! - Create a pool the first time a key is appended to
//! - Route the empty key to the configured default group
//!
//! # Design Decisions
//! - The map only guards creation; pool traffic goes through each pool's own lock
//! - The pool `Arc` is cloned out of the map before use, so a slow append on one
//!   key never holds a map shard while another key is looked up
//! - Lookups never create groups

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::RegistryConfig;
use crate::rotation::{candidate::Candidate, pool::Pool, stats::PoolStats};

/// Pools grouped by key, with a fallback default key.
#[derive(Debug)]
pub struct PoolRegistry<T> {
    default_key: String,
    groups: DashMap<String, Arc<Pool<T>>>,
}

impl<T> PoolRegistry<T> {
    /// Create an empty registry. Empty keys will resolve to `default_key`.
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            default_key: default_key.into(),
            groups: DashMap::new(),
        }
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    fn normalize<'a>(&'a self, key: &'a str) -> &'a str {
        if key.is_empty() {
            &self.default_key
        } else {
            key
        }
    }

    /// Append values to the pool for `key`, creating the pool if needed.
    pub fn append<I>(&self, key: &str, values: I) -> &Self
    where
        I: IntoIterator<Item = T>,
    {
        let key = self.normalize(key);
        let existing = self.groups.get(key).map(|pool| Arc::clone(pool.value()));
        let pool = match existing {
            Some(pool) => pool,
            None => {
                // Check and insert under the same shard lock.
                let entry = self.groups.entry(key.to_string()).or_insert_with(|| {
                    tracing::debug!(group = %key, "Creating pool for new group");
                    Arc::new(Pool::named(key))
                });
                Arc::clone(entry.value())
            }
        };
        pool.append(values);
        self
    }

    /// The pool behind `key`, if one exists.
    pub fn pool(&self, key: &str) -> Option<Arc<Pool<T>>> {
        let key = self.normalize(key);
        self.groups.get(key).map(|pool| Arc::clone(pool.value()))
    }

    /// Next available candidate from the pool behind `key`.
    ///
    /// `None` if the group does not exist or has nothing available.
    pub fn get(&self, key: &str) -> Option<Arc<Candidate<T>>> {
        match self.pool(key) {
            Some(pool) => pool.get(),
            None => {
                tracing::debug!(group = %self.normalize(key), "Group not found in registry");
                None
            }
        }
    }

    /// Blocking wait on the pool behind `key`. See [`Pool::must_get`].
    ///
    /// `None` immediately if the group does not exist.
    pub fn must_get(&self, key: &str, poll_interval: Duration) -> Option<Arc<Candidate<T>>> {
        self.pool(key)?.must_get(poll_interval)
    }

    /// Async wait on the pool behind `key`. See [`Pool::must_get_async`].
    pub async fn must_get_async(&self, key: &str, poll_interval: Duration) -> Option<Arc<Candidate<T>>> {
        let pool = self.pool(key)?;
        pool.must_get_async(poll_interval).await
    }

    /// All group keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.groups.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Health summary per group.
    pub fn stats(&self) -> BTreeMap<String, PoolStats> {
        // Clone the pools out first so no shard stays locked while counting.
        let pools: Vec<(String, Arc<Pool<T>>)> = self
            .groups
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();
        pools.into_iter().map(|(key, pool)| (key, pool.stats())).collect()
    }
}

impl PoolRegistry<String> {
    /// Build a registry of string values from a loaded configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let registry = Self::new(config.default_key.clone());
        for group in &config.groups {
            registry.append(&group.key, group.members.iter().cloned());
        }
        tracing::info!(
            default_key = %registry.default_key(),
            groups = registry.len(),
            "Pool registry built from configuration"
        );
        registry
    }
}
