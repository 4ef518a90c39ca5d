//! Pass-rate derivation.
//!
//! Rates are always computed from counts. Grouping sums `count` and
//! `failures` first and derives afterwards; averaging per-test rates
//! weighs a test with 5 runs the same as one with 5000.

use crate::record::{JobRollup, TestRecord};

/// `1 - failures/count`, or `None` when there were no executions.
pub fn pass_rate(count: u64, failures: u64) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(1.0 - failures as f64 / count as f64)
    }
}

/// Records that carry execution counts and a derived pass rate.
pub trait Counted: Clone {
    fn count(&self) -> u64;
    fn failures(&self) -> u64;
    fn with_pass_rate(self, rate: Option<f64>) -> Self;
}

impl Counted for TestRecord {
    fn count(&self) -> u64 {
        self.count
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn with_pass_rate(mut self, rate: Option<f64>) -> Self {
        self.pass_rate = rate;
        self
    }
}

impl Counted for JobRollup {
    fn count(&self) -> u64 {
        self.count
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn with_pass_rate(mut self, rate: Option<f64>) -> Self {
        self.pass_rate = rate;
        self
    }
}

/// Return a copy of `records` with `pass_rate` recomputed from counts.
pub fn derive_rates<T: Counted>(records: &[T]) -> Vec<T> {
    records
        .iter()
        .map(|r| {
            let rate = pass_rate(r.count(), r.failures());
            r.clone().with_pass_rate(rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate_basic() {
        assert_eq!(pass_rate(10, 2), Some(0.8));
        assert_eq!(pass_rate(5, 5), Some(0.0));
        assert_eq!(pass_rate(7, 0), Some(1.0));
    }

    #[test]
    fn test_zero_count_is_undefined() {
        assert_eq!(pass_rate(0, 0), None);
    }

    #[test]
    fn test_derive_overwrites_stale_rate() {
        let mut stale = TestRecord::new("a", "t", 10, 5);
        stale.pass_rate = Some(0.99);
        let derived = derive_rates(&[stale]);
        assert_eq!(derived[0].pass_rate, Some(0.5));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let records = vec![
            TestRecord::new("a", "t1", 3, 1),
            TestRecord::new("a", "t2", 0, 0),
            TestRecord::new("b", "t3", 9, 9),
        ];
        let once = derive_rates(&records);
        let twice = derive_rates(&once);
        assert_eq!(once, twice);
    }
}
