//! Leaderboard assembly: rollup → rank → annotate, then the same per job for its tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::{ReportConfig, DEFAULT_LIMIT};
use crate::error::BoardResult;
use crate::group::group_by_job;
use crate::record::{JobRollup, RecordStore, TestRecord};
use crate::severity::SeverityScale;

use super::{Category, LeaderboardEntry, Leaderboards, RankedEntry, Report, ReportSummary};

/// Per-call leaderboard sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Jobs per leaderboard.
    pub job_limit: usize,
    /// Tests per job.
    pub test_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            job_limit: DEFAULT_LIMIT,
            test_limit: DEFAULT_LIMIT,
        }
    }
}

impl ReportOptions {
    pub fn with_job_limit(mut self, limit: usize) -> Self {
        self.job_limit = limit;
        self
    }

    pub fn with_test_limit(mut self, limit: usize) -> Self {
        self.test_limit = limit;
        self
    }
}

#[derive(Debug, Clone)]
struct CategoryScales {
    job: SeverityScale,
    test: SeverityScale,
}

/// Builds leaderboards from a [`RecordStore`]. Severity scales (and their
/// gradients) are built once here and reused for every run.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    scales: HashMap<Category, CategoryScales>,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(&ReportConfig::default())
    }
}

impl ReportAssembler {
    pub fn new(config: &ReportConfig) -> Self {
        let scales = Category::ALL
            .into_iter()
            .map(|category| {
                let measure = category.rank_spec().measure;
                let level = config.thresholds.get(category);
                let scales = CategoryScales {
                    job: SeverityScale::new(measure, level.job),
                    test: SeverityScale::new(measure, level.test),
                };
                (category, scales)
            })
            .collect();
        Self { scales }
    }

    /// All four leaderboards. The store is only read; rollups are computed once.
    pub fn assemble(&self, store: &RecordStore, options: ReportOptions) -> BoardResult<Leaderboards> {
        let rollups = group_by_job(store.records())?;
        let tests_by_job = index_by_job(store.records());
        let mut boards = Leaderboards::default();
        for category in Category::ALL {
            *boards.slot(category) =
                self.leaderboard_from(&rollups, &tests_by_job, category, options);
        }
        tracing::info!(
            records = store.len(),
            jobs = rollups.len(),
            job_limit = options.job_limit,
            test_limit = options.test_limit,
            "assembled leaderboards"
        );
        Ok(boards)
    }

    /// A single category's leaderboard.
    pub fn leaderboard(
        &self,
        store: &RecordStore,
        category: Category,
        options: ReportOptions,
    ) -> BoardResult<Vec<LeaderboardEntry>> {
        let rollups = group_by_job(store.records())?;
        let tests_by_job = index_by_job(store.records());
        Ok(self.leaderboard_from(&rollups, &tests_by_job, category, options))
    }

    /// Leaderboards plus summary scalars, stamped with `generated`.
    pub fn report(
        &self,
        store: &RecordStore,
        options: ReportOptions,
        generated: DateTime<Utc>,
    ) -> BoardResult<Report> {
        Ok(Report {
            summary: ReportSummary::from_store(store, generated),
            leaderboards: self.assemble(store, options)?,
        })
    }

    fn leaderboard_from(
        &self,
        rollups: &[JobRollup],
        tests_by_job: &HashMap<&str, Vec<&TestRecord>>,
        category: Category,
        options: ReportOptions,
    ) -> Vec<LeaderboardEntry> {
        let spec = category.rank_spec();
        let scales = &self.scales[&category];

        spec.rank(rollups, options.job_limit)
            .into_iter()
            .filter_map(|rollup| {
                let severity = scales.job.assess(&rollup)?;
                let tests = match tests_by_job.get(rollup.job.as_str()) {
                    Some(tests) => spec
                        .rank(tests, options.test_limit)
                        .into_iter()
                        .filter_map(|test| {
                            scales.test.assess(test).map(|severity| RankedEntry {
                                record: test.clone(),
                                severity,
                            })
                        })
                        .collect(),
                    None => {
                        tracing::debug!(
                            job = %rollup.job,
                            category = category.key(),
                            "no test rows for job"
                        );
                        Vec::new()
                    }
                };
                Some(LeaderboardEntry {
                    rollup,
                    severity,
                    tests,
                })
            })
            .collect()
    }
}

fn index_by_job(records: &[TestRecord]) -> HashMap<&str, Vec<&TestRecord>> {
    let mut by_job: HashMap<&str, Vec<&TestRecord>> = HashMap::new();
    for record in records {
        by_job.entry(record.job.as_str()).or_default().push(record);
    }
    by_job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdTable;
    use crate::severity::Thresholds;

    fn store(records: Vec<TestRecord>) -> RecordStore {
        RecordStore::new(records).unwrap()
    }

    #[test]
    fn test_default_options() {
        let opts = ReportOptions::default();
        assert_eq!(opts.job_limit, 10);
        assert_eq!(opts.test_limit, 10);
        let opts = opts.with_job_limit(3).with_test_limit(1);
        assert_eq!((opts.job_limit, opts.test_limit), (3, 1));
    }

    #[test]
    fn test_nested_tests_are_filtered_to_job() {
        let s = store(vec![
            TestRecord::new("A", "a1", 10, 4),
            TestRecord::new("B", "b1", 10, 9),
            TestRecord::new("A", "a2", 10, 6),
        ]);
        let board = ReportAssembler::default()
            .leaderboard(&s, Category::MostFailing, ReportOptions::default())
            .unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].rollup.job, "A");
        assert_eq!(board[0].rollup.failures, 10);
        let a_tests: Vec<&str> = board[0].tests.iter().map(|t| t.record.test.as_str()).collect();
        assert_eq!(a_tests, vec!["a2", "a1"]);
        assert_eq!(board[1].tests.len(), 1);
        assert_eq!(board[1].tests[0].record.job, "B");
    }

    #[test]
    fn test_test_limit_applies_per_job() {
        let s = store(
            (0..5)
                .map(|i| TestRecord::new("A", format!("t{}", i), 10, i))
                .collect(),
        );
        let board = ReportAssembler::default()
            .leaderboard(
                &s,
                Category::MostFailing,
                ReportOptions::default().with_test_limit(2),
            )
            .unwrap();
        assert_eq!(board[0].tests.len(), 2);
        assert_eq!(board[0].tests[0].record.test, "t4");
    }

    #[test]
    fn test_job_level_and_test_level_thresholds_differ() {
        let s = store(vec![TestRecord::new("A", "t1", 100, 50)]);
        let board = ReportAssembler::default()
            .leaderboard(&s, Category::MostFailing, ReportOptions::default())
            .unwrap();
        // 50 of 500 at job level, 50 of 50 at test level.
        assert_eq!(board[0].severity.band, 10);
        assert_eq!(board[0].tests[0].severity.band, 99);
    }

    #[test]
    fn test_zero_count_tests_are_dropped_from_pass_rate_tests() {
        let s = store(vec![
            TestRecord::new("A", "idle", 0, 0),
            TestRecord::new("A", "flaky", 10, 3),
        ]);
        let board = ReportAssembler::default()
            .leaderboard(&s, Category::LowestPassRate, ReportOptions::default())
            .unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].tests.len(), 1);
        assert_eq!(board[0].tests[0].record.test, "flaky");
        assert_eq!(board[0].tests[0].severity.label, "70%");
    }

    #[test]
    fn test_custom_thresholds_flow_into_severity() {
        let mut config = ReportConfig::default();
        config.thresholds = ThresholdTable {
            most_failing: crate::config::LevelThresholds::new(
                Thresholds::new(0.0, 10.0),
                Thresholds::new(0.0, 10.0),
            ),
            ..ThresholdTable::default()
        };
        let s = store(vec![TestRecord::new("A", "t1", 10, 5)]);
        let board = ReportAssembler::new(&config)
            .leaderboard(&s, Category::MostFailing, ReportOptions::default())
            .unwrap();
        assert_eq!(board[0].severity.band, 50);
    }

    #[test]
    fn test_assemble_leaves_store_untouched() {
        let records = vec![
            TestRecord::new("A", "t1", 10, 2).with_durations(40.0, 400.0),
            TestRecord::new("B", "t2", 5, 0).with_durations(80.0, 90.0),
        ];
        let s = store(records.clone());
        let before = s.records().to_vec();
        let boards = ReportAssembler::default()
            .assemble(&s, ReportOptions::default())
            .unwrap();
        assert_eq!(s.records(), before.as_slice());
        for category in Category::ALL {
            assert_eq!(boards.get(category).len(), 2, "{}", category.key());
        }
        assert_eq!(boards.slowest[0].rollup.job, "B");
        assert_eq!(boards.longest[0].rollup.job, "A");
    }

    #[test]
    fn test_empty_store() {
        let boards = ReportAssembler::default()
            .assemble(&RecordStore::default(), ReportOptions::default())
            .unwrap();
        assert_eq!(boards, Leaderboards::default());
    }
}
