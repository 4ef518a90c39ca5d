//! Human-readable labels for durations and counts.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const DAYS_PER_MONTH: f64 = 30.5;

/// Longest span described; larger inputs are capped here (999,999,999 days).
pub const MAX_DELTA_SECONDS: u64 = 999_999_999 * DAY;

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Describe a span of seconds in the coarsest sensible unit ("3 hours", "a day").
///
/// Fractional seconds are dropped; anything under one second is "a moment".
/// Spans beyond [`MAX_DELTA_SECONDS`] are described as that maximum.
pub fn natural_delta(seconds: f64) -> String {
    let whole = if seconds.is_finite() {
        (seconds.abs().trunc() as u64).min(MAX_DELTA_SECONDS)
    } else {
        0
    };
    let total_days = whole / DAY;
    let secs = whole % DAY;
    let years = total_days / 365;
    let days = total_days % 365;
    let months = (days as f64 / DAYS_PER_MONTH) as u64;

    if years == 0 && days == 0 {
        return match secs {
            0 => "a moment".to_string(),
            1 => "a second".to_string(),
            s if s < MINUTE => plural(s, "second"),
            s if s < 2 * MINUTE => "a minute".to_string(),
            s if s < HOUR => plural(s / MINUTE, "minute"),
            s if s < 2 * HOUR => "an hour".to_string(),
            s => plural(s / HOUR, "hour"),
        };
    }

    match years {
        0 => {
            if days == 1 {
                "a day".to_string()
            } else if months == 0 {
                plural(days, "day")
            } else if months == 1 {
                "a month".to_string()
            } else {
                plural(months, "month")
            }
        }
        1 => {
            if months == 0 && days == 0 {
                "a year".to_string()
            } else if months == 0 {
                format!("1 year, {}", plural(days, "day"))
            } else {
                format!("1 year, {}", plural(months, "month"))
            }
        }
        n => plural(n, "year"),
    }
}

/// Format an integer with comma thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
