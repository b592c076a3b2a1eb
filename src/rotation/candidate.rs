//! A single selectable value and its health state.
//!
//! # Responsibilities
//! - Hold the caller's value for the lifetime of the pool
//! - Track a sticky failure flag
//! - Track a self-expiring hold deadline
//!
//! # Design Decisions
//! - Both health signals are atomics, so a handle can be marked from any thread
//!   without touching the pool lock
//! - Deadlines are nanoseconds on a process-wide monotonic clock, 0 = not held

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Start of the monotonic clock used for hold deadlines.
static CLOCK_ANCHOR: OnceLock<Instant> = OnceLock::new();

fn now_nanos() -> u64 {
    let anchor = CLOCK_ANCHOR.get_or_init(Instant::now);
    u64::try_from(anchor.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// One value in a pool, plus whether it may currently be handed out.
#[derive(Debug)]
pub struct Candidate<T> {
    value: T,
    /// Sticky until `mark_as_available`.
    failed: AtomicBool,
    /// Deadline on the monotonic clock; 0 means not held.
    hold_until: AtomicU64,
}

impl<T> Candidate<T> {
    /// Wrap a value. Fresh candidates are available.
    pub fn new(value: T) -> Self {
        Self {
            value,
            failed: AtomicBool::new(false),
            hold_until: AtomicU64::new(0),
        }
    }

    /// True if not failed and any hold has expired.
    pub fn is_available(&self) -> bool {
        !self.is_failed() && now_nanos() >= self.hold_until.load(Ordering::Acquire)
    }

    /// True if the sticky failure flag is set.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Time left on the current hold, if any.
    pub fn hold_remaining(&self) -> Option<Duration> {
        let until = self.hold_until.load(Ordering::Acquire);
        let now = now_nanos();
        if until == 0 || now >= until {
            return None;
        }
        Some(Duration::from_nanos(until - now))
    }

    /// Set the sticky failure flag. Leaves any hold in place.
    pub fn mark_as_failure(&self) {
        self.failed.store(true, Ordering::Release);
        crate::observability::metrics::record_mark("failure");
        tracing::trace!("Candidate marked as failed");
    }

    /// Block selection for `duration` from now.
    ///
    /// Replaces any previous deadline instead of extending it. The failure flag
    /// is left untouched.
    pub fn mark_as_hold(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let until = now_nanos().saturating_add(nanos);
        self.hold_until.store(until, Ordering::Release);
        crate::observability::metrics::record_mark("hold");
        tracing::trace!(hold_ms = duration.as_millis() as u64, "Candidate held");
    }

    /// Clear both the failure flag and the hold deadline.
    pub fn mark_as_available(&self) {
        self.failed.store(false, Ordering::Release);
        self.hold_until.store(0, Ordering::Release);
        crate::observability::metrics::record_mark("available");
        tracing::trace!("Candidate marked as available");
    }

    /// The wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Candidate<T> {
    /// An owned copy of the wrapped value.
    pub fn cloned_value(&self) -> T {
        self.value.clone()
    }
}
