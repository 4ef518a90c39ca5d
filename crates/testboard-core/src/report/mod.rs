pub mod assemble;
pub mod console;
pub mod json;
pub mod summary;

pub use assemble::{ReportAssembler, ReportOptions};
pub use summary::{Generated, ReportSummary};

use serde::Serialize;

use crate::rank::RankSpec;
use crate::record::{JobRollup, TestRecord};
use crate::severity::Severity;

/// The four leaderboards of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    LowestPassRate,
    MostFailing,
    Slowest,
    Longest,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::LowestPassRate,
        Category::MostFailing,
        Category::Slowest,
        Category::Longest,
    ];

    /// Stable key used in serialized output and config.
    pub fn key(&self) -> &'static str {
        match self {
            Self::LowestPassRate => "lowest_pass_rate",
            Self::MostFailing => "most_failing",
            Self::Slowest => "slowest",
            Self::Longest => "longest",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LowestPassRate => "Lowest pass rate",
            Self::MostFailing => "Most failing",
            Self::Slowest => "Slowest (p90)",
            Self::Longest => "Longest (total)",
        }
    }

    pub fn rank_spec(&self) -> RankSpec {
        match self {
            Self::LowestPassRate => RankSpec::LOWEST_PASS_RATE,
            Self::MostFailing => RankSpec::MOST_FAILING,
            Self::Slowest => RankSpec::SLOWEST,
            Self::Longest => RankSpec::LONGEST,
        }
    }
}

/// A ranked record with its severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry<T> {
    #[serde(flatten)]
    pub record: T,
    pub severity: Severity,
}

/// One job in a leaderboard, with its own top tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub rollup: JobRollup,
    pub severity: Severity,
    pub tests: Vec<RankedEntry<TestRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboards {
    pub lowest_pass_rate: Vec<LeaderboardEntry>,
    pub most_failing: Vec<LeaderboardEntry>,
    pub slowest: Vec<LeaderboardEntry>,
    pub longest: Vec<LeaderboardEntry>,
}

impl Leaderboards {
    pub fn get(&self, category: Category) -> &[LeaderboardEntry] {
        match category {
            Category::LowestPassRate => &self.lowest_pass_rate,
            Category::MostFailing => &self.most_failing,
            Category::Slowest => &self.slowest,
            Category::Longest => &self.longest,
        }
    }

    fn slot(&mut self, category: Category) -> &mut Vec<LeaderboardEntry> {
        match category {
            Category::LowestPassRate => &mut self.lowest_pass_rate,
            Category::MostFailing => &mut self.most_failing,
            Category::Slowest => &mut self.slowest,
            Category::Longest => &mut self.longest,
        }
    }
}

/// Everything a renderer needs: summary scalars plus the leaderboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub leaderboards: Leaderboards,
}
