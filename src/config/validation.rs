//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval > 0, hold bounds ordered)
//! - Detect duplicate groups and empty members
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RegistryConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RegistryConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("default_key must not be empty")]
    EmptyDefaultKey,

    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("hold.base_ms ({base_ms}) exceeds hold.max_ms ({max_ms})")]
    HoldBoundsInverted { base_ms: u64, max_ms: u64 },

    #[error("group '{0}' is defined more than once")]
    DuplicateGroup(String),

    #[error("group '{0}' has an empty member")]
    EmptyMember(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RegistryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.default_key.is_empty() {
        errors.push(ValidationError::EmptyDefaultKey);
    }
    if config.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.hold.base_ms > config.hold.max_ms {
        errors.push(ValidationError::HoldBoundsInverted {
            base_ms: config.hold.base_ms,
            max_ms: config.hold.max_ms,
        });
    }

    let mut seen = HashSet::new();
    for group in &config.groups {
        // Same alias rule as the registry.
        let key = if group.key.is_empty() {
            config.default_key.as_str()
        } else {
            group.key.as_str()
        };
        if !seen.insert(key) {
            errors.push(ValidationError::DuplicateGroup(key.to_string()));
        }
        if group.members.iter().any(|m| m.is_empty()) {
            errors.push(ValidationError::EmptyMember(key.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
