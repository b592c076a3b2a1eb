//! Hold lengths for repeatedly throttled candidates.

use std::time::Duration;

use rand::Rng;

use crate::config::HoldConfig;

/// Past this many doublings every realistic base is already over any sane cap.
const MAX_DOUBLINGS: u32 = 31;

/// Largest fraction of a hold added as random spread.
const MAX_SPREAD: f64 = 0.1;

impl HoldConfig {
    /// Hold for a candidate throttled `throttles` times in a row.
    ///
    /// Zero throttles means no hold. Each further throttle doubles the hold
    /// starting from `base_ms`; the doubled hold gets up to 10% random spread
    /// and is then clamped, so the result never exceeds `max_ms`.
    pub fn duration_for(&self, throttles: u32) -> Duration {
        if throttles == 0 {
            return Duration::ZERO;
        }

        let ceiling = Duration::from_millis(self.max_ms);
        let doublings = (throttles - 1).min(MAX_DOUBLINGS);
        let grown = Duration::from_millis(self.base_ms)
            .saturating_mul(1u32 << doublings)
            .min(ceiling);

        with_spread(grown).min(ceiling)
    }
}

fn with_spread(hold: Duration) -> Duration {
    let spread = rand::thread_rng().gen_range(0.0..=MAX_SPREAD);
    hold.mul_f64(1.0 + spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hold(base_ms: u64, max_ms: u64) -> HoldConfig {
        HoldConfig { base_ms, max_ms }
    }

    #[test]
    fn test_no_throttle_no_hold() {
        assert_eq!(hold(100, 2000).duration_for(0), Duration::ZERO);
    }

    #[test]
    fn test_hold_doubles_per_throttle() {
        let config = hold(100, 2000);

        let first = config.duration_for(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(110));

        let third = config.duration_for(3);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(440));
    }

    #[test]
    fn test_hold_never_exceeds_max() {
        let config = hold(1000, 1000);
        for throttles in [1, 2, 20, u32::MAX] {
            for _ in 0..200 {
                assert!(config.duration_for(throttles) <= Duration::from_millis(1000));
            }
        }
    }

    #[test]
    fn test_spread_stays_below_max_when_not_capped() {
        let config = hold(100, 60_000);
        for _ in 0..200 {
            let d = config.duration_for(2);
            assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(220));
        }
    }
}
