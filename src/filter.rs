//! Task list filter baseline and its query-string mirror.
//!
//! The `{q, statuses, sortBy}` triple decides which tasks are fetched. It is
//! serialized to a query string on every fetch (shareable, bookmarkable) and
//! restored from one on deep-link navigation. Array-valued `statuses` are
//! encoded by repeating the key (`statuses=a&statuses=b`), never with
//! explicit indices.

use std::collections::BTreeSet;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Task status filters, as the server spells them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
    WontDo,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
            TaskStatus::WontDo => "won't do",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(TaskStatus::Pending),
            "done" => Some(TaskStatus::Done),
            "won't do" => Some(TaskStatus::WontDo),
            _ => None,
        }
    }
}

/// Sort options accepted by the task search endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    Score,
    CreatedAt,
    Deadline,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Score => "score",
            SortOption::CreatedAt => "createdAt",
            SortOption::Deadline => "deadline",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "score" => Some(SortOption::Score),
            "createdAt" => Some(SortOption::CreatedAt),
            "deadline" => Some(SortOption::Deadline),
            _ => None,
        }
    }
}

/// The filter baseline governing which tasks are fetched and displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub q: String,
    pub statuses: BTreeSet<TaskStatus>,
    pub sort_by: Option<SortOption>,
}

impl TaskFilter {
    /// Insert the status if absent, remove it if present. Its own inverse.
    pub fn toggle_status(&mut self, status: TaskStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    /// Query pairs in wire order: `q`, repeated `statuses`, `sortBy`.
    /// Empty and unset fields are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.q.is_empty() {
            pairs.push(("q", self.q.clone()));
        }
        for status in &self.statuses {
            pairs.push(("statuses", status.as_str().to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            pairs.push(("sortBy", sort_by.as_str().to_string()));
        }
        pairs
    }

    /// Percent-encoded query string for the current baseline.
    pub fn to_query_string(&self) -> String {
        let mut url = Url::parse("http://filter.invalid/").expect("static url");
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.to_query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url.query().unwrap_or_default().to_string()
    }

    /// Parse a query string, merging the fields it carries over this filter
    /// as defaults. A lone `statuses` value still yields a one-element set.
    /// Unknown status and sort tokens are skipped.
    pub fn merge_query(&self, raw: &str) -> Result<TaskFilter> {
        let raw = raw.trim().trim_start_matches('?');
        let url = Url::parse(&format!("http://filter.invalid/?{raw}"))
            .map_err(|err| Error::InvalidFilter(format!("{raw}: {err}")))?;

        let mut merged = self.clone();
        let mut statuses: Option<BTreeSet<TaskStatus>> = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "q" => merged.q = value.into_owned(),
                "statuses" => {
                    let set = statuses.get_or_insert_with(BTreeSet::new);
                    if let Some(status) = TaskStatus::parse(value.as_ref()) {
                        set.insert(status);
                    }
                }
                "sortBy" => {
                    if let Some(sort_by) = SortOption::parse(value.as_ref()) {
                        merged.sort_by = Some(sort_by);
                    }
                }
                _ => {}
            }
        }

        if let Some(statuses) = statuses {
            merged.statuses = statuses;
        }

        Ok(merged)
    }
}
