//! Top-N ranking by a single measure.

use serde::{Deserialize, Serialize};

use crate::record::{JobRollup, TestRecord};

/// A numeric column a leaderboard can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    PassRate,
    Failures,
    P90Duration,
    TotalDuration,
}

impl Measure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassRate => "pass_rate",
            Self::Failures => "failures",
            Self::P90Duration => "p90_duration",
            Self::TotalDuration => "total_duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

/// Anything that exposes the rankable measures.
///
/// `None` means the measure is undefined for this record (a pass rate with
/// zero executions) and the record is not eligible for that ranking.
pub trait Measured {
    fn job(&self) -> &str;
    fn measure(&self, measure: Measure) -> Option<f64>;
}

impl Measured for TestRecord {
    fn job(&self) -> &str {
        &self.job
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::PassRate => self.pass_rate,
            Measure::Failures => Some(self.failures as f64),
            Measure::P90Duration => Some(self.p90_duration),
            Measure::TotalDuration => Some(self.total_duration),
        }
    }
}

impl Measured for JobRollup {
    fn job(&self) -> &str {
        &self.job
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::PassRate => self.pass_rate,
            Measure::Failures => Some(self.failures as f64),
            Measure::P90Duration => Some(self.p90_duration),
            Measure::TotalDuration => Some(self.total_duration),
        }
    }
}

impl<T: Measured + ?Sized> Measured for &T {
    fn job(&self) -> &str {
        (**self).job()
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        (**self).measure(measure)
    }
}

/// Stable sort of the eligible records by `measure`, truncated to `limit`.
///
/// Records with equal keys keep their input order.
pub fn rank<T: Measured + Clone>(
    records: &[T],
    measure: Measure,
    direction: Direction,
    limit: usize,
) -> Vec<T> {
    let mut eligible: Vec<(f64, &T)> = records
        .iter()
        .filter_map(|r| r.measure(measure).map(|key| (key, r)))
        .collect();
    // slice::sort_by is stable.
    eligible.sort_by(|(a, _), (b, _)| match direction {
        Direction::Ascending => a.total_cmp(b),
        Direction::Descending => b.total_cmp(a),
    });
    eligible
        .into_iter()
        .take(limit)
        .map(|(_, r)| r.clone())
        .collect()
}

/// A measure paired with the direction in which it gets worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSpec {
    pub measure: Measure,
    pub direction: Direction,
}

impl RankSpec {
    pub const LOWEST_PASS_RATE: Self = Self {
        measure: Measure::PassRate,
        direction: Direction::Ascending,
    };
    pub const MOST_FAILING: Self = Self {
        measure: Measure::Failures,
        direction: Direction::Descending,
    };
    pub const SLOWEST: Self = Self {
        measure: Measure::P90Duration,
        direction: Direction::Descending,
    };
    pub const LONGEST: Self = Self {
        measure: Measure::TotalDuration,
        direction: Direction::Descending,
    };

    pub fn rank<T: Measured + Clone>(&self, records: &[T], limit: usize) -> Vec<T> {
        rank(records, self.measure, self.direction, limit)
    }
}
