//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rotation subsystem produces:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (selection counters, availability gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing subscribers/recorders is up to
//!   the binary, so embedding applications keep control
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
