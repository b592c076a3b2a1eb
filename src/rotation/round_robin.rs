//! Shared round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin cursor.
/// Only ever increases; callers read it modulo the current length.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary cursor position.
    pub fn starting_at(position: usize) -> Self {
        Self {
            counter: AtomicUsize::new(position),
        }
    }

    /// Advance the cursor and return the index it lands on.
    /// Returns `None` for an empty sequence.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        // Wraps at usize::MAX; the modulo keeps the index in range either way.
        Some(self.counter.fetch_add(1, Ordering::Relaxed) % len)
    }
}
