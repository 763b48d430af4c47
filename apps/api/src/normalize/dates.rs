//! Free-text posting date → whole days elapsed.
//!
//! Rules are tried in order and the first match wins:
//! relative hours → 0, "yesterday" → 1, "N day(s) ago" → N,
//! absolute calendar date → days since, anything else → 0.

use chrono::{DateTime, NaiveDate, Utc};

const HOUR_MARKERS: &[&str] = &["hr ago", "hrs ago", "hour ago", "hours ago"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Days elapsed between the posting label and `today`. Never negative.
pub fn days_ago(label: &str, today: NaiveDate) -> u32 {
    let trimmed = label.trim();
    let text = trimmed.to_lowercase();

    if text.is_empty() {
        return 0;
    }
    if HOUR_MARKERS.iter().any(|m| text.contains(m)) {
        return 0;
    }
    if text.contains("yesterday") {
        return 1;
    }
    if let Some(days) = parse_relative_days(&text) {
        return days;
    }
    if let Some(date) = parse_absolute_date(trimmed) {
        return days_between(date, today);
    }

    0
}

/// Matches `<integer> day ago` / `<integer> days ago` anywhere in the label,
/// ignoring surrounding punctuation. "30+ days ago" reads as 30; counts too
/// large for `u32` saturate.
fn parse_relative_days(text: &str) -> Option<u32> {
    let tokens: Vec<&str> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '+'))
        .filter(|t| !t.is_empty())
        .collect();

    tokens.windows(3).find_map(|w| {
        if !matches!(w[1], "day" | "days") || w[2] != "ago" {
            return None;
        }
        parse_count(w[0].trim_end_matches('+'))
    })
}

fn parse_count(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token.parse::<u32>().unwrap_or(u32::MAX))
}

fn parse_absolute_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn days_between(posted: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - posted).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}
