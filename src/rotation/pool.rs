//! Round-robin pool of candidates.
//!
//! # Responsibilities
//! - Own an append-only sequence of candidates
//! - Hand out the next available candidate in rotation
//! - Optionally wait until one frees up
//!
//! # Design Decisions
//! - Appends take the write lock; everything else shares the read lock
//! - Health is read lock-free from each candidate, so a scan can race with a
//!   concurrent mark; it only ever gives up when the available count is zero
//! - Waiting variants release the lock while sleeping so appends can proceed

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use std::time::Duration;

use crate::observability::metrics;
use crate::rotation::{candidate::Candidate, round_robin::RoundRobin, stats::PoolStats};

const UNNAMED: &str = "unnamed";

/// An ordered pool of interchangeable values with round-robin selection.
#[derive(Debug)]
pub struct Pool<T> {
    /// Label for logs and metrics.
    name: Option<String>,
    cursor: RoundRobin,
    items: RwLock<Vec<Arc<Candidate<T>>>>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    /// Create an empty, unnamed pool.
    pub fn new() -> Self {
        Self {
            name: None,
            cursor: RoundRobin::new(),
            items: RwLock::new(Vec::new()),
        }
    }

    /// Create an empty pool labelled `name` in logs and metrics.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }

    fn read_items(&self) -> RwLockReadGuard<'_, Vec<Arc<Candidate<T>>>> {
        // A panic elsewhere cannot leave the Vec half-pushed, so the data is still sound.
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_items(&self) -> RwLockWriteGuard<'_, Vec<Arc<Candidate<T>>>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wrap each value in a fresh candidate and add it to the end of the pool.
    pub fn append<I>(&self, values: I) -> &Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = self.write_items();
        let before = items.len();
        items.extend(values.into_iter().map(|v| Arc::new(Candidate::new(v))));
        tracing::debug!(pool = %self.label(), added = items.len() - before, total = items.len(), "Candidates appended");
        self
    }

    /// Add a single value.
    pub fn push(&self, value: T) -> &Self {
        self.append(std::iter::once(value))
    }

    /// Number of candidates, available or not.
    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of candidates that could be selected right now.
    pub fn available_count(&self) -> usize {
        count_available(&self.read_items())
    }

    /// Snapshot of every candidate handle, in insertion order.
    pub fn candidates(&self) -> Vec<Arc<Candidate<T>>> {
        self.read_items().clone()
    }

    /// Next available candidate in rotation, or `None` if nothing can serve.
    pub fn get(&self) -> Option<Arc<Candidate<T>>> {
        let selected = select(&self.read_items(), &self.cursor);
        if selected.is_none() {
            tracing::debug!(pool = %self.label(), "No available candidates in pool");
        }
        metrics::record_selection(self.label(), selected.is_some());
        selected
    }

    /// Like [`Pool::get`], but sleeps `poll_interval` and retries while nothing
    /// is available.
    ///
    /// Returns `None` immediately if the pool has no candidates at all.
    /// Otherwise blocks until a candidate becomes available; there is no
    /// timeout, use [`Pool::must_get_async`] under `tokio::time::timeout` for that.
    pub fn must_get(&self, poll_interval: Duration) -> Option<Arc<Candidate<T>>> {
        loop {
            match self.try_select() {
                Attempt::Empty => return None,
                Attempt::Selected(c) => return Some(c),
                Attempt::Busy => {
                    tracing::debug!(pool = %self.label(), poll_ms = poll_interval.as_millis() as u64, "Waiting for an available candidate");
                    thread::sleep(poll_interval);
                }
            }
        }
    }

    /// Async counterpart of [`Pool::must_get`], sleeping on the tokio timer.
    pub async fn must_get_async(&self, poll_interval: Duration) -> Option<Arc<Candidate<T>>> {
        loop {
            match self.try_select() {
                Attempt::Empty => return None,
                Attempt::Selected(c) => return Some(c),
                Attempt::Busy => {
                    tracing::debug!(pool = %self.label(), poll_ms = poll_interval.as_millis() as u64, "Waiting for an available candidate");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    fn try_select(&self) -> Attempt<T> {
        let items = self.read_items();
        if items.is_empty() {
            return Attempt::Empty;
        }
        match select(&items, &self.cursor) {
            Some(c) => {
                metrics::record_selection(self.label(), true);
                Attempt::Selected(c)
            }
            None => {
                metrics::record_selection(self.label(), false);
                Attempt::Busy
            }
        }
    }

    /// Health summary of the pool.
    pub fn stats(&self) -> PoolStats {
        let items = self.read_items();
        let mut stats = PoolStats {
            total: items.len(),
            ..PoolStats::default()
        };
        for c in items.iter() {
            if c.is_failed() {
                stats.failed += 1;
            } else if c.is_available() {
                stats.available += 1;
            } else {
                stats.held += 1;
            }
        }
        metrics::record_available(self.label(), stats.available);
        stats
    }
}

enum Attempt<T> {
    Empty,
    Busy,
    Selected(Arc<Candidate<T>>),
}

fn count_available<T>(items: &[Arc<Candidate<T>>]) -> usize {
    items.iter().filter(|c| c.is_available()).count()
}

/// Advance the cursor until it lands on an available candidate.
///
/// Each step re-counts availability, so the loop ends as soon as nothing can
/// serve, even if other threads are flipping health while it runs.
fn select<T>(items: &[Arc<Candidate<T>>], cursor: &RoundRobin) -> Option<Arc<Candidate<T>>> {
    loop {
        if count_available(items) == 0 {
            return None;
        }
        let index = cursor.next_index(items.len())?;
        let candidate = &items[index];
        if candidate.is_available() {
            return Some(Arc::clone(candidate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    /// Recorder that only counts `pool_selections_total{outcome="miss"}`.
    struct MissCounter(Arc<AtomicU64>);

    impl ::metrics::Recorder for MissCounter {
        fn describe_counter(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_gauge(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}
        fn describe_histogram(&self, _: ::metrics::KeyName, _: Option<::metrics::Unit>, _: ::metrics::SharedString) {}

        fn register_counter(&self, key: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Counter {
            let miss = key.name() == "pool_selections_total"
                && key.labels().any(|l| l.key() == "outcome" && l.value() == "miss");
            if miss {
                ::metrics::Counter::from_arc(Arc::clone(&self.0))
            } else {
                ::metrics::Counter::noop()
            }
        }

        fn register_gauge(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Gauge {
            ::metrics::Gauge::noop()
        }

        fn register_histogram(&self, _: &::metrics::Key, _: &::metrics::Metadata<'_>) -> ::metrics::Histogram {
            ::metrics::Histogram::noop()
        }
    }

    #[test]
    fn test_empty_pool() {
        let pool: Pool<&str> = Pool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.available_count(), 0);
        assert!(pool.get().is_none());

        let start = Instant::now();
        assert!(pool.must_get(Duration::from_secs(5)).is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_append_chains() {
        let pool = Pool::new();
        pool.append(["a", "b"]).push("c").append(vec!["d"]);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.available_count(), 4);
        let values: Vec<&str> = pool.candidates().iter().map(|c| *c.value()).collect();
        assert_eq!(values, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_round_robin_visits_each_once() {
        let pool = Pool::new();
        pool.append(["a", "b", "c"]);

        let seen: Vec<&str> = (0..3).map(|_| *pool.get().unwrap().value()).collect();
        let unique: HashSet<&str> = seen.iter().copied().collect();
        assert_eq!(unique.len(), 3);

        // The cursor starts at zero, so the order is insertion order.
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[test]
    fn test_all_failed_returns_none() {
        let pool = Pool::new();
        pool.append(["a", "b", "c"]);
        for c in pool.candidates() {
            c.mark_as_failure();
        }
        assert!(pool.get().is_none());

        pool.candidates()[1].mark_as_available();
        for _ in 0..6 {
            assert_eq!(*pool.get().unwrap().value(), "b");
        }
    }

    #[test]
    fn test_held_candidates_are_skipped() {
        let pool = Pool::new();
        pool.append([1, 2, 3]);
        let handles = pool.candidates();
        handles[0].mark_as_hold(Duration::from_secs(60));
        handles[2].mark_as_failure();

        for _ in 0..5 {
            assert_eq!(*pool.get().unwrap().value(), 2);
        }
        assert_eq!(pool.available_count(), 1);
    }

    #[test]
    fn test_stats() {
        let pool = Pool::named("openai");
        pool.append(["k1", "k2", "k3", "k4"]);
        let handles = pool.candidates();
        handles[0].mark_as_failure();
        handles[0].mark_as_hold(Duration::from_secs(60));
        handles[1].mark_as_hold(Duration::from_secs(60));

        let stats = pool.stats();
        assert_eq!(
            stats,
            PoolStats {
                total: 4,
                available: 2,
                failed: 1,
                held: 1,
            }
        );
        assert!(stats.is_healthy());
        assert_eq!(pool.name(), Some("openai"));
    }

    #[test]
    fn test_must_get_returns_immediately_when_available() {
        let pool = Pool::new();
        pool.append(["a"]);
        let start = Instant::now();
        assert_eq!(*pool.must_get(Duration::from_secs(5)).unwrap().value(), "a");
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_must_get_waits_for_hold_to_expire() {
        let pool = Pool::new();
        pool.append(["a"]);
        pool.candidates()[0].mark_as_hold(Duration::from_millis(30));

        let start = Instant::now();
        let c = pool.must_get(Duration::from_millis(5)).unwrap();
        assert_eq!(*c.value(), "a");
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_must_get_records_misses_while_waiting() {
        let misses = Arc::new(AtomicU64::new(0));
        let recorder = MissCounter(Arc::clone(&misses));

        let pool = Pool::named("waiting");
        pool.append(["a"]);
        pool.candidates()[0].mark_as_hold(Duration::from_millis(30));

        let selected = ::metrics::with_local_recorder(&recorder, || pool.must_get(Duration::from_millis(5)));
        assert!(selected.is_some());
        assert!(misses.load(Ordering::Relaxed) >= 1);
    }
}
