//! Report configuration: leaderboard limits and severity thresholds.
//!
//! ```yaml
//! version: 1
//! job_limit: 10
//! test_limit: 5
//! thresholds:
//!   most_failing:
//!     job: { min: 0, max: 1000 }
//!     test: { min: 0, max: 100 }
//! ```
//!
//! Anything omitted falls back to the built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};
use crate::report::{Category, ReportOptions};
use crate::severity::Thresholds;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub version: u32,
    pub job_limit: usize,
    pub test_limit: usize,
    pub thresholds: ThresholdTable,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            job_limit: DEFAULT_LIMIT,
            test_limit: DEFAULT_LIMIT,
            thresholds: ThresholdTable::default(),
        }
    }
}

/// Job- and test-level thresholds for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelThresholds {
    pub job: Thresholds,
    pub test: Thresholds,
}

impl LevelThresholds {
    pub const fn new(job: Thresholds, test: Thresholds) -> Self {
        Self { job, test }
    }
}

/// Per-category thresholds. On load, any category or level left out of the
/// YAML keeps its default range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ThresholdOverrides")]
pub struct ThresholdTable {
    /// Deficit from 100% in percentage points.
    pub lowest_pass_rate: LevelThresholds,
    pub most_failing: LevelThresholds,
    /// p90 seconds.
    pub slowest: LevelThresholds,
    /// Total seconds.
    pub longest: LevelThresholds,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            lowest_pass_rate: LevelThresholds::new(
                Thresholds::new(0.0, 20.0),
                Thresholds::new(0.0, 20.0),
            ),
            most_failing: LevelThresholds::new(
                Thresholds::new(0.0, 500.0),
                Thresholds::new(0.0, 50.0),
            ),
            slowest: LevelThresholds::new(
                Thresholds::new(600.0, 1800.0),
                Thresholds::new(30.0, 90.0),
            ),
            longest: LevelThresholds::new(
                Thresholds::new(0.0, 259_200.0),
                Thresholds::new(0.0, 10_800.0),
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ThresholdOverrides {
    lowest_pass_rate: LevelOverrides,
    most_failing: LevelOverrides,
    slowest: LevelOverrides,
    longest: LevelOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LevelOverrides {
    job: Option<Thresholds>,
    test: Option<Thresholds>,
}

impl LevelOverrides {
    fn or(self, base: LevelThresholds) -> LevelThresholds {
        LevelThresholds::new(self.job.unwrap_or(base.job), self.test.unwrap_or(base.test))
    }
}

impl From<ThresholdOverrides> for ThresholdTable {
    fn from(raw: ThresholdOverrides) -> Self {
        let base = Self::default();
        Self {
            lowest_pass_rate: raw.lowest_pass_rate.or(base.lowest_pass_rate),
            most_failing: raw.most_failing.or(base.most_failing),
            slowest: raw.slowest.or(base.slowest),
            longest: raw.longest.or(base.longest),
        }
    }
}

impl ThresholdTable {
    pub fn get(&self, category: Category) -> LevelThresholds {
        match category {
            Category::LowestPassRate => self.lowest_pass_rate,
            Category::MostFailing => self.most_failing,
            Category::Slowest => self.slowest,
            Category::Longest => self.longest,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> BoardResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| BoardError::Config {
            message: format!("failed to read config {}: {}", path.display(), e),
        })?;
        let cfg = Self::from_yaml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded report config");
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> BoardResult<Self> {
        // An empty document means "all defaults".
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(raw).map_err(|e| BoardError::Config {
            message: format!("failed to parse YAML: {}", e),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> BoardResult<()> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(BoardError::Config {
                message: format!(
                    "unsupported config version {} (supported: {})",
                    self.version, SUPPORTED_CONFIG_VERSION
                ),
            });
        }
        for category in Category::ALL {
            let level = self.thresholds.get(category);
            for (name, t) in [("job", level.job), ("test", level.test)] {
                if !t.min.is_finite() || !t.max.is_finite() || t.min > t.max {
                    return Err(BoardError::Config {
                        message: format!(
                            "thresholds.{}.{}: expected finite min <= max, got [{}, {}]",
                            category.key(),
                            name,
                            t.min,
                            t.max
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            job_limit: self.job_limit,
            test_limit: self.test_limit,
        }
    }
}
