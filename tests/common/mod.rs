//! Shared utilities for integration tests.

use std::time::{Duration, Instant};

use rotating_pool::Pool;

/// A pool of `n` numbered keys, `key-0` .. `key-{n-1}`.
#[allow(dead_code)]
pub fn numbered_pool(name: &str, n: usize) -> Pool<String> {
    let pool = Pool::named(name);
    pool.append((0..n).map(|i| format!("key-{}", i)));
    pool
}

/// Poll `check` every millisecond until it holds or `limit` passes.
/// Returns the time it took, or `None` on timeout.
#[allow(dead_code)]
pub fn wait_for<F>(limit: Duration, mut check: F) -> Option<Duration>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < limit {
        if check() {
            return Some(start.elapsed());
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    None
}
