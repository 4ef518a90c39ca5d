//! Test execution records and the immutable store they are ranked from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BoardError, BoardResult, RecordLocator};
use crate::rate::{derive_rates, pass_rate};
use crate::source::QueryResponse;

const JOB_COLUMNS: &[&str] = &["job"];
const TEST_COLUMNS: &[&str] = &["test", "test_id"];
const COUNT_COLUMNS: &[&str] = &["count"];
const FAILURE_COLUMNS: &[&str] = &["failures"];
const P90_COLUMNS: &[&str] = &["p90_duration", "d90"];
const TOTAL_COLUMNS: &[&str] = &["total_duration", "dtotal"];
const START_COLUMNS: &[&str] = &["start"];
const END_COLUMNS: &[&str] = &["end"];

/// One test's executions within one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub job: String,
    /// Full test name.
    pub test: String,
    pub count: u64,
    pub failures: u64,
    /// `1 - failures/count`; absent when `count == 0`.
    #[serde(default)]
    pub pass_rate: Option<f64>,
    /// 90th percentile duration, seconds.
    pub p90_duration: f64,
    /// Summed duration, seconds.
    pub total_duration: f64,
    /// Earliest run start in the window (epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Latest run end in the window (epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl TestRecord {
    pub fn new(job: impl Into<String>, test: impl Into<String>, count: u64, failures: u64) -> Self {
        Self {
            job: job.into(),
            test: test.into(),
            count,
            failures,
            pass_rate: pass_rate(count, failures),
            p90_duration: 0.0,
            total_duration: 0.0,
            start: None,
            end: None,
        }
    }

    pub fn with_durations(mut self, p90_duration: f64, total_duration: f64) -> Self {
        self.p90_duration = p90_duration;
        self.total_duration = total_duration;
        self
    }

    pub fn with_window(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    fn validate(&self, row: usize) -> BoardResult<()> {
        let loc = || RecordLocator::Row(row);
        if self.failures > self.count {
            return Err(BoardError::malformed(
                loc(),
                "failures",
                format!(
                    "{} failures exceed {} executions",
                    self.failures, self.count
                ),
            ));
        }
        check_seconds(self.p90_duration, loc(), "p90_duration")?;
        check_seconds(self.total_duration, loc(), "total_duration")?;
        Ok(())
    }
}

/// Per-job aggregate of [`TestRecord`]s.
///
/// Counts and durations are sums over the job's tests; `pass_rate` is derived
/// from the summed counts, never averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRollup {
    pub job: String,
    pub count: u64,
    pub failures: u64,
    #[serde(default)]
    pub pass_rate: Option<f64>,
    pub p90_duration: f64,
    pub total_duration: f64,
}

impl JobRollup {
    pub(crate) fn empty(job: &str) -> Self {
        Self {
            job: job.to_string(),
            count: 0,
            failures: 0,
            pass_rate: None,
            p90_duration: 0.0,
            total_duration: 0.0,
        }
    }
}

/// Immutable snapshot of validated test records for one report run.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<TestRecord>,
}

impl RecordStore {
    /// Validate hand-built records and derive their pass rates.
    pub fn new(records: Vec<TestRecord>) -> BoardResult<Self> {
        for (row, record) in records.iter().enumerate() {
            record.validate(row)?;
        }
        Ok(Self {
            records: derive_rates(&records),
        })
    }

    /// Build a store from a columnar query response (`header` + `data` rows).
    pub fn from_response(response: &QueryResponse) -> BoardResult<Self> {
        let columns = Columns::resolve(&response.header)?;
        let mut records = Vec::with_capacity(response.data.len());
        for (row, values) in response.data.iter().enumerate() {
            let record = columns.read(row, values)?;
            record.validate(row)?;
            records.push(record);
        }
        tracing::debug!(records = records.len(), "loaded test records");
        Ok(Self {
            records: derive_rates(&records),
        })
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total executions across all records.
    pub fn total_count(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.count))
    }

    /// Earliest start and latest end over all records that carry them.
    pub fn window(&self) -> (Option<i64>, Option<i64>) {
        let start = self.records.iter().filter_map(|r| r.start).min();
        let end = self.records.iter().filter_map(|r| r.end).max();
        (start, end)
    }
}

struct Columns {
    job: usize,
    test: usize,
    count: usize,
    failures: usize,
    p90: usize,
    total: usize,
    start: Option<usize>,
    end: Option<usize>,
}

impl Columns {
    fn resolve(header: &[String]) -> BoardResult<Self> {
        let find = |names: &[&str]| header.iter().position(|h| names.contains(&h.as_str()));
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| BoardError::MissingColumn {
                field: names[0].to_string(),
                header: header.to_vec(),
            })
        };
        Ok(Self {
            job: require(JOB_COLUMNS)?,
            test: require(TEST_COLUMNS)?,
            count: require(COUNT_COLUMNS)?,
            failures: require(FAILURE_COLUMNS)?,
            p90: require(P90_COLUMNS)?,
            total: require(TOTAL_COLUMNS)?,
            start: find(START_COLUMNS),
            end: find(END_COLUMNS),
        })
    }

    fn read(&self, row: usize, values: &[Value]) -> BoardResult<TestRecord> {
        let cell = |idx: usize| values.get(idx).unwrap_or(&Value::Null);
        let start = match self.start {
            Some(idx) => coerce_timestamp(cell(idx), row, "start")?,
            None => None,
        };
        let end = match self.end {
            Some(idx) => coerce_timestamp(cell(idx), row, "end")?,
            None => None,
        };
        Ok(TestRecord {
            job: coerce_identifier(cell(self.job), row, "job")?,
            test: coerce_identifier(cell(self.test), row, "test")?,
            count: coerce_integer(cell(self.count), row, "count")?,
            failures: coerce_integer(cell(self.failures), row, "failures")?,
            pass_rate: None,
            p90_duration: coerce_seconds(cell(self.p90), row, "p90_duration")?,
            total_duration: coerce_seconds(cell(self.total), row, "total_duration")?,
            start,
            end,
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_identifier(value: &Value, row: usize, field: &str) -> BoardResult<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            "identifier is empty",
        )),
        other => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            format!("expected a string, got {}", kind(other)),
        )),
    }
}

/// Integer columns may arrive as floats or numeric strings; fractions are truncated.
fn coerce_integer(value: &Value, row: usize, field: &str) -> BoardResult<u64> {
    let as_float = match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
            n.as_f64()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<u64>() {
                return Ok(v);
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    match as_float {
        Some(f) if f.is_finite() && f >= 0.0 => Ok(f.trunc() as u64),
        Some(f) => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            format!("expected a non-negative integer, got {}", f),
        )),
        None => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            format!("expected an integer, got {}", describe(value)),
        )),
    }
}

fn coerce_seconds(value: &Value, row: usize, field: &str) -> BoardResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(secs) => {
            check_seconds(secs, RecordLocator::Row(row), field)?;
            Ok(secs)
        }
        None => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            format!("expected seconds, got {}", describe(value)),
        )),
    }
}

fn coerce_timestamp(value: &Value, row: usize, field: &str) -> BoardResult<Option<i64>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(ts) if ts.is_finite() => Ok(Some(ts.floor() as i64)),
        _ => Err(BoardError::malformed(
            RecordLocator::Row(row),
            field,
            format!("expected an epoch timestamp, got {}", describe(value)),
        )),
    }
}

fn check_seconds(secs: f64, locator: RecordLocator, field: &str) -> BoardResult<()> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(())
    } else {
        Err(BoardError::malformed(
            locator,
            field,
            format!("expected finite non-negative seconds, got {}", secs),
        ))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string '{}'", s),
        Value::Null => "null (missing value)".to_string(),
        other => kind(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(header: &[&str], data: Value) -> QueryResponse {
        QueryResponse {
            header: header.iter().map(|h| h.to_string()).collect(),
            data: serde_json::from_value(data).unwrap(),
        }
    }

    const HEADER: &[&str] = &["job", "test_id", "test_name", "d90", "dtotal", "count", "failures"];

    #[test]
    fn test_from_response_accepts_column_aliases() {
        let resp = response(
            HEADER,
            json!([["smoke", "tests/test_login.py::test_ok", "test_ok", 12.5, 300.0, 40, 4]]),
        );
        let store = RecordStore::from_response(&resp).unwrap();
        let r = &store.records()[0];
        assert_eq!(r.job, "smoke");
        assert_eq!(r.test, "tests/test_login.py::test_ok");
        assert_eq!(r.count, 40);
        assert_eq!(r.failures, 4);
        assert_eq!(r.p90_duration, 12.5);
        assert_eq!(r.total_duration, 300.0);
        assert!((r.pass_rate.unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_failures_coerced_from_float_and_string() {
        let resp = response(
            HEADER,
            json!([
                ["a", "t1", "t1", 1.0, 1.0, 10, 2.0],
                ["a", "t2", "t2", 1.0, 1.0, "8", "3"],
                ["a", "t3", "t3", 1.0, 1.0, 5, 1.9]
            ]),
        );
        let store = RecordStore::from_response(&resp).unwrap();
        let failures: Vec<u64> = store.records().iter().map(|r| r.failures).collect();
        assert_eq!(failures, vec![2, 3, 1]);
        assert_eq!(store.records()[1].count, 8);
    }

    #[test]
    fn test_zero_count_has_no_pass_rate() {
        let resp = response(HEADER, json!([["a", "t1", "t1", 0.0, 0.0, 0, 0]]));
        let store = RecordStore::from_response(&resp).unwrap();
        assert_eq!(store.records()[0].pass_rate, None);
    }

    #[test]
    fn test_non_numeric_failures_is_malformed() {
        let resp = response(HEADER, json!([["a", "t1", "t1", 1.0, 1.0, 10, 0], ["a", "t2", "t2", 1.0, 1.0, 10, "lots"]]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        match err {
            BoardError::MalformedInput { locator, field, .. } => {
                assert_eq!(locator, RecordLocator::Row(1));
                assert_eq!(field, "failures");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failures_exceeding_count_is_malformed() {
        let resp = response(HEADER, json!([["a", "t1", "t1", 1.0, 1.0, 3, 5]]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("5 failures exceed 3 executions"));
    }

    #[test]
    fn test_missing_required_column() {
        let resp = response(&["job", "test", "count", "failures", "d90"], json!([]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        assert!(matches!(err, BoardError::MissingColumn { ref field, .. } if field == "total_duration"));
    }

    #[test]
    fn test_null_identifier_and_short_row() {
        let resp = response(HEADER, json!([[null, "t1", "t1", 1.0, 1.0, 1, 0]]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("field 'job'"));

        let resp = response(HEADER, json!([["a", "t1", "t1", 1.0, 1.0, 1]]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("null (missing value)"));
    }

    #[test]
    fn test_negative_duration_is_malformed() {
        let resp = response(HEADER, json!([["a", "t1", "t1", -1.0, 1.0, 1, 0]]));
        let err = RecordStore::from_response(&resp).unwrap_err();
        assert!(err.to_string().contains("p90_duration"));
    }

    #[test]
    fn test_window_and_total_count() {
        let header = &["job", "test", "d90", "dtotal", "count", "failures", "start", "end"];
        let resp = response(
            header,
            json!([
                ["a", "t1", 1.0, 1.0, 1000, 0, 1_600_000_100.5, 1_600_000_900],
                ["b", "t2", 1.0, 1.0, 2345, 1, 1_600_000_000, null]
            ]),
        );
        let store = RecordStore::from_response(&resp).unwrap();
        assert_eq!(store.total_count(), 3345);
        assert_eq!(store.window(), (Some(1_600_000_000), Some(1_600_000_900)));
    }

    #[test]
    fn test_new_validates_hand_built_records() {
        let err = RecordStore::new(vec![TestRecord::new("a", "t", 1, 2)]).unwrap_err();
        assert!(err.is_malformed_input());

        let store = RecordStore::new(vec![TestRecord::new("a", "t", 4, 1)]).unwrap();
        assert_eq!(store.records()[0].pass_rate, Some(0.75));
    }
}
