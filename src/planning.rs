//! Planning state: the singleton "current plan" resource.
//!
//! The plan is a derived view over the task list. The server holds at most
//! one active plan per session; the client replaces its copy wholesale on
//! every fetch so it never goes stale relative to the tasks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{parse_duration, Task};

const DEFAULT_TASK_DURATION: Duration = Duration::from_secs(60 * 60);

/// The current plan as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub id: u64,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Planning {
    /// A plan is done once every planned task is done.
    pub fn done(&self) -> bool {
        self.tasks.iter().all(|task| task.is_done())
    }

    /// Sum of planned task durations, counting tasks without a parseable
    /// duration as one hour.
    pub fn total_duration(&self) -> Duration {
        self.tasks
            .iter()
            .map(|task| {
                task.duration
                    .as_deref()
                    .and_then(parse_duration)
                    .unwrap_or(DEFAULT_TASK_DURATION)
            })
            .sum()
    }
}

/// Planning module state slice.
#[derive(Debug, Clone, Default)]
pub struct PlanningState {
    pub planning: Option<Planning>,
    pub loading: bool,
}
