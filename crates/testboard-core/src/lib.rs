//! Aggregation and ranking engine for CI test leaderboards.
//!
//! Turns a flat collection of per-test execution records into four ranked
//! leaderboards (lowest pass rate, most failing, slowest, longest), each a
//! list of job rollups carrying their own top tests:
//!
//! - [`RecordStore`]: validated, immutable record snapshot
//! - [`rate`]: pass-rate derivation (sum-then-derive)
//! - [`group`]: per-job rollups in first-appearance order
//! - [`rank`]: stable, direction-aware top-N selection
//! - [`severity`]: fixed-threshold color gradient and labels
//! - [`report`]: leaderboard assembly, summary, JSON and console output
//!
//! # Quick Start
//!
//! ```no_run
//! use testboard_core::{load_store, FileSource, ReportAssembler, ReportOptions};
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = FileSource::new("queries");
//! let store = load_store(&source, "durations_by_test")?;
//! let boards = ReportAssembler::default().assemble(&store, ReportOptions::default())?;
//! for entry in &boards.most_failing {
//!     println!("{} {} {}", entry.rollup.job, entry.rollup.failures, entry.severity.color);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod group;
pub mod humanize;
pub mod rank;
pub mod rate;
pub mod record;
pub mod report;
pub mod severity;
pub mod source;

pub use config::{LevelThresholds, ReportConfig, ThresholdTable, SUPPORTED_CONFIG_VERSION};
pub use error::{BoardError, BoardResult, RecordLocator};
pub use group::group_by_job;
pub use rank::{rank, Direction, Measure, Measured, RankSpec};
pub use rate::{derive_rates, pass_rate};
pub use record::{JobRollup, RecordStore, TestRecord};
pub use report::{
    Category, LeaderboardEntry, Leaderboards, RankedEntry, Report, ReportAssembler,
    ReportOptions, ReportSummary,
};
pub use severity::{Gradient, LabelStyle, Rgb, Severity, SeverityScale, Thresholds};
pub use source::cache::{CacheEntry, CacheMeta, CachedSource, QueryCache};
pub use source::{load_store, FileSource, QueryResponse, RecordSource};
