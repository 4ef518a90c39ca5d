//! Per-job rollups.

use std::collections::HashMap;

use crate::error::{BoardError, BoardResult, RecordLocator};
use crate::rate::derive_rates;
use crate::record::{JobRollup, TestRecord};

/// Collapse per-test records into one [`JobRollup`] per job.
///
/// Rollups are emitted in first-appearance order of the job, which is the
/// tie-break order for every later ranking. Pass rates are derived from the
/// summed counts after aggregation.
pub fn group_by_job(records: &[TestRecord]) -> BoardResult<Vec<JobRollup>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<JobRollup> = Vec::new();

    for record in records {
        let slot = *index.entry(record.job.as_str()).or_insert_with(|| {
            rollups.push(JobRollup::empty(&record.job));
            rollups.len() - 1
        });
        let acc = &mut rollups[slot];
        acc.count = checked_sum(acc.count, record.count, &record.job, "count")?;
        acc.failures = checked_sum(acc.failures, record.failures, &record.job, "failures")?;
        acc.p90_duration += record.p90_duration;
        acc.total_duration += record.total_duration;
    }

    for rollup in &rollups {
        if rollup.failures > rollup.count {
            return Err(BoardError::malformed(
                RecordLocator::Job(rollup.job.clone()),
                "failures",
                format!(
                    "{} failures exceed {} executions",
                    rollup.failures, rollup.count
                ),
            ));
        }
    }

    tracing::debug!(
        records = records.len(),
        jobs = rollups.len(),
        "grouped records by job"
    );
    Ok(derive_rates(&rollups))
}

fn checked_sum(acc: u64, value: u64, job: &str, field: &str) -> BoardResult<u64> {
    acc.checked_add(value).ok_or_else(|| {
        BoardError::malformed(
            RecordLocator::Job(job.to_string()),
            field,
            "sum overflows a 64-bit counter",
        )
    })
}
