//! Summary scalars shown alongside the leaderboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::humanize::group_thousands;
use crate::record::RecordStore;

const DATE_FORMAT: &str = "%d-%b-%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total executions, comma-grouped (e.g. "12,345").
    pub total: String,
    pub total_count: u64,
    /// First day covered, when the records carry window timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Last day covered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub generated: Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generated {
    pub date: String,
    pub time: String,
}

impl ReportSummary {
    pub fn from_store(store: &RecordStore, generated: DateTime<Utc>) -> Self {
        let total_count = store.total_count();
        let (start, end) = store.window();
        Self {
            total: group_thousands(total_count),
            total_count,
            start: start.and_then(format_day),
            end: end.and_then(format_day),
            generated: Generated {
                date: generated.format(DATE_FORMAT).to_string(),
                time: generated.format(TIME_FORMAT).to_string(),
            },
        }
    }
}

fn format_day(epoch_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0).map(|dt| dt.format(DATE_FORMAT).to_string())
}
