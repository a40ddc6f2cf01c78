//! Task data model and derived state.
//!
//! Tasks arrive from the API with an append-only `log`. Completion and
//! workflow status are never stored: they are computed by scanning the log
//! on every read. Logs are immutable once appended and short, so the scans
//! stay pure functions with no caching.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback for tasks without a parseable duration.
const DEFAULT_TASK_DURATION: Duration = Duration::from_secs(60 * 60);

/// Workflow log entry types, as the server spells them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    Progress,
    Pause,
    Start,
    WontDo,
    Comment,
    Postpone,
}

/// A single entry in a task's workflow log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub completion: u8,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A task dependency reference, ordered as the server returns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: u64,
    pub done: bool,
    pub title: String,
}

/// A task as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub rank: u64,
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    pub score: f64,

    #[serde(default)]
    pub log: Vec<Log>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Highest completion recorded in the log, 0 for an empty log.
    pub fn completion(&self) -> u8 {
        self.log.iter().map(|log| log.completion).max().unwrap_or(0)
    }

    /// A task is done once any entry reaches completion 100, regardless of
    /// later entries with lower values.
    pub fn is_done(&self) -> bool {
        self.log.iter().any(|log| log.completion == 100)
    }

    pub fn is_wont_do(&self) -> bool {
        self.log.iter().any(|log| log.log_type == LogType::WontDo)
    }

    pub fn is_pending(&self) -> bool {
        !self.is_done() && !self.is_wont_do()
    }

    /// A pending task is worked on when the most recent START/PAUSE entry
    /// is a START.
    pub fn is_worked_on(&self) -> bool {
        if !self.is_pending() {
            return false;
        }

        self.log
            .iter()
            .rev()
            .find(|log| matches!(log.log_type, LogType::Start | LogType::Pause))
            .map(|log| log.log_type == LogType::Start)
            .unwrap_or(false)
    }

    /// Postponement date from the last POSTPONE entry, if any. The server
    /// stores the date at the end of the entry description
    /// ("postponed until 2019-06-03").
    pub fn postponed_until(&self) -> Option<NaiveDate> {
        let entry = self
            .log
            .iter()
            .rev()
            .find(|log| log.log_type == LogType::Postpone)?;
        let date = entry.description.rsplit(' ').next()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    pub fn is_postponed(&self) -> bool {
        self.postponed_until().is_some()
    }

    /// Remaining work time: the declared duration scaled by what is left to
    /// complete. Tasks without a parseable duration count as one hour.
    pub fn left_duration(&self) -> Duration {
        let total = self
            .duration
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(DEFAULT_TASK_DURATION);
        total.mul_f64(f64::from(100 - u32::from(self.completion())) / 100.0)
    }
}

/// Parse a Go-style duration string ("1h30m", "45m", "20s").
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut number = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }

        let value: u64 = number.parse().ok()?;
        number.clear();
        total += match ch {
            'h' => value * 3600,
            'm' => value * 60,
            's' => value,
            _ => return None,
        };
    }

    if !number.is_empty() {
        // Trailing bare number has no unit
        return None;
    }

    Some(Duration::from_secs(total))
}
