//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Candidate throttled (e.g. HTTP 429 from an API key)
//!     → backoff.rs (hold length from consecutive throttle count)
//!     → candidate.mark_as_hold(duration)
//! ```
//!
//! # Design Decisions
//! - Holds grow exponentially and are capped
//! - Jitter spreads recoveries so throttled candidates do not return in lockstep

pub mod backoff;
