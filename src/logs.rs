//! Device Log Filtering
//!
//! Exact level matching and inclusive time windows over the mock log entries
//! embedded in each device record.

use crate::topology::LogEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset-bearing layouts tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts without an offset; read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp. A trailing `Z` means UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(base) => format!("{}+00:00", base),
        None => raw.to_string(),
    };
    let text = normalized.as_str();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Query parameters accepted by the log endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Resolved filter: empty strings and unparseable bounds are dropped here
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub level: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn from_query(query: &LogQuery) -> Self {
        Self {
            level: non_empty(&query.level).map(str::to_string),
            since: non_empty(&query.since).and_then(parse_timestamp),
            until: non_empty(&query.until).and_then(parse_timestamp),
        }
    }

    fn has_time_bound(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    /// Whether a single entry passes every active criterion
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(ref level) = self.level {
            if entry.level_str() != Some(level.as_str()) {
                return false;
            }
        }

        if !self.has_time_bound() {
            return true;
        }

        // Once a bound is active, entries without a readable time are out
        let Some(time) = entry.time_str().and_then(parse_timestamp) else {
            return false;
        };

        if self.since.is_some_and(|since| time < since) {
            return false;
        }
        if self.until.is_some_and(|until| time > until) {
            return false;
        }

        true
    }

    /// Keep matching entries in their original order
    pub fn apply(&self, logs: &[LogEntry]) -> Vec<LogEntry> {
        logs.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// Convenience wrapper over [`LogFilter`]
pub fn filter_logs(logs: &[LogEntry], query: &LogQuery) -> Vec<LogEntry> {
    LogFilter::from_query(query).apply(logs)
}
