use std::fmt::Write;

use crate::report::{Category, LeaderboardEntry, Report};

const NAME_WIDTH: usize = 48;

/// Plain-text rendering of a report, one section per category.
#[must_use]
pub fn render_console(report: &Report) -> String {
    let mut out = String::new();
    let s = &report.summary;
    let _ = write!(out, "{} test executions", s.total);
    if let (Some(start), Some(end)) = (&s.start, &s.end) {
        let _ = write!(out, " from {} to {}", start, end);
    }
    let _ = writeln!(
        out,
        " (generated {} {})",
        s.generated.date, s.generated.time
    );

    for category in Category::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", category.title());
        let board = report.leaderboards.get(category);
        if board.is_empty() {
            let _ = writeln!(out, "  (no data)");
            continue;
        }
        for (idx, entry) in board.iter().enumerate() {
            render_entry(&mut out, idx + 1, entry);
        }
    }
    out
}

fn render_entry(out: &mut String, position: usize, entry: &LeaderboardEntry) {
    let _ = writeln!(
        out,
        "{:>3}. {:<width$} {:>12}  {}",
        position,
        truncate(&entry.rollup.job, NAME_WIDTH),
        entry.severity.label,
        entry.severity.color,
        width = NAME_WIDTH
    );
    for test in &entry.tests {
        let _ = writeln!(
            out,
            "       {:<width$} {:>10}  {}",
            truncate(&test.record.test, NAME_WIDTH - 2),
            test.severity.label,
            test.severity.color,
            width = NAME_WIDTH - 2
        );
    }
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let keep: String = name.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", keep)
}
