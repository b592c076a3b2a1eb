//! Candidate rotation subsystem.
//!
//! # Data Flow
//! ```text
//! Caller appends values
//!     → registry.rs (normalize key, create pool lazily)
//!     → pool.rs (wrap each value in a Candidate)
//!
//! Caller asks for the next candidate
//!     → registry.rs (normalize key, look up pool)
//!     → pool.rs (count available, advance round_robin.rs cursor)
//!     → candidate.rs (available = !failed && hold expired)
//!     → Some(handle) or None
//!
//! Caller reports the outcome on the handle
//!     → mark_as_failure / mark_as_hold / mark_as_available
//! ```
//!
//! # Design Decisions
//! - Absence is `None`, never an error
//! - Pools only grow; candidates are never removed
//! - The sequence is guarded by a RwLock, health is per-candidate atomics
//! - Round-robin order is fair over time, not strict under concurrency

pub mod candidate;
pub mod pool;
pub mod registry;
pub mod round_robin;
pub mod stats;

pub use candidate::Candidate;
pub use pool::Pool;
pub use registry::PoolRegistry;
pub use stats::PoolStats;
