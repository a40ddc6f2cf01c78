//! Task list commands
//!
//! Implements `tonight tasks list`, `add`, `edit`, `log`, and `delete`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::events::Action;
use crate::filter::{SortOption, TaskFilter, TaskStatus};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::Store;
use crate::task::Task;

/// Options for `tonight tasks list`
pub struct ListOptions {
    pub query: Option<String>,
    pub statuses: Vec<String>,
    pub sort: Option<String>,
    pub from_query: Option<String>,
    pub output: OutputOptions,
}

/// Output for `tonight tasks list`
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub query_string: String,
    pub tasks: Vec<Task>,
}

/// Output for single-task commands
#[derive(Debug, Serialize)]
pub struct TaskOutput {
    pub task: Task,
}

/// Output for commands that only carry the task id
#[derive(Debug, Serialize)]
pub struct IdOutput {
    pub id: u64,
}

/// Run `tonight tasks list`
pub async fn run_list(store: &Store, opts: ListOptions) -> Result<()> {
    if let Some(raw) = filter_query(&opts)? {
        // Loading filters triggers the fetch
        store.dispatch(Action::LoadFiltersFromQuery(raw)).await?;
    } else {
        store.dispatch(Action::FetchTasks).await?;
    }

    let tasks = store.tasks();
    let query_string = store.query_string();

    let mut human = HumanOutput::new(match tasks.len() {
        1 => "1 task".to_string(),
        n => format!("{n} tasks"),
    });
    if !query_string.is_empty() {
        human.push_summary("filter", query_string.clone());
    }
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(
        opts.output,
        "tasks list",
        &ListOutput {
            query_string,
            tasks,
        },
        Some(&human),
    )
}

/// Run `tonight tasks add`
pub async fn run_add(store: &Store, content: String, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::CreateTask { content }).await?;

    let task = store
        .tasks()
        .last()
        .cloned()
        .ok_or_else(|| Error::InvalidArgument("server returned no task".to_string()))?;

    let human = HumanOutput::new(format!("Created #{}: {}", task.id, task.title));
    emit_success(options, "tasks add", &TaskOutput { task }, Some(&human))
}

/// Run `tonight tasks edit`
pub async fn run_edit(
    store: &Store,
    id: u64,
    content: String,
    options: OutputOptions,
) -> Result<()> {
    // Fetch first so the updated task is visible in the snapshot
    store.dispatch(Action::FetchTasks).await?;
    store
        .dispatch(Action::UpdateTask {
            task_id: id,
            content,
        })
        .await?;

    match find_task(store, id) {
        Ok(task) => {
            let human = HumanOutput::new(format!("Updated #{}: {}", task.id, task.title));
            emit_success(options, "tasks edit", &TaskOutput { task }, Some(&human))
        }
        // The task can sit outside the current filtered view
        Err(Error::TaskNotFound(_)) => {
            let human = HumanOutput::new(format!("Updated #{id}"));
            emit_success(options, "tasks edit", &IdOutput { id }, Some(&human))
        }
        Err(err) => Err(err),
    }
}

/// Run `tonight tasks log`
pub async fn run_log(store: &Store, id: u64, entry: String, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::FetchTasks).await?;
    store
        .dispatch(Action::LogForTask {
            task_id: id,
            log: entry.clone(),
        })
        .await?;

    match find_task(store, id) {
        Ok(task) => {
            let mut human = HumanOutput::new(format!("Logged '{entry}' for #{}", task.id));
            human.push_summary("completion", format!("{}%", task.completion()));
            emit_success(options, "tasks log", &TaskOutput { task }, Some(&human))
        }
        // A completing log refetches the list, and the task may drop out of
        // the filtered view
        Err(Error::TaskNotFound(_)) => {
            let human = HumanOutput::new(format!("Logged '{entry}' for #{id}"));
            emit_success(options, "tasks log", &IdOutput { id }, Some(&human))
        }
        Err(err) => Err(err),
    }
}

/// Run `tonight tasks delete`
pub async fn run_delete(store: &Store, id: u64, options: OutputOptions) -> Result<()> {
    store.dispatch(Action::DeleteTask { task_id: id }).await?;

    let human = HumanOutput::new(format!("Deleted #{id}"));
    emit_success(options, "tasks delete", &IdOutput { id }, Some(&human))
}

/// Compose the raw query string the list command loads its filters from.
/// Explicit flags are validated strictly; `--from-query` is passed through
/// and gets the lenient deep-link treatment.
fn filter_query(opts: &ListOptions) -> Result<Option<String>> {
    if let Some(raw) = &opts.from_query {
        return Ok(Some(raw.clone()));
    }

    if opts.query.is_none() && opts.statuses.is_empty() && opts.sort.is_none() {
        return Ok(None);
    }

    let mut filter = TaskFilter::default();
    if let Some(q) = &opts.query {
        filter.q = q.clone();
    }
    for raw in &opts.statuses {
        let status = TaskStatus::parse(raw).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown status '{raw}' (expected pending, done, or \"won't do\")"
            ))
        })?;
        filter.statuses.insert(status);
    }
    if let Some(raw) = &opts.sort {
        filter.sort_by = Some(SortOption::parse(raw).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unknown sort field '{raw}' (expected score, createdAt, or deadline)"
            ))
        })?);
    }

    Ok(Some(filter.to_query_string()))
}

fn find_task(store: &Store, id: u64) -> Result<Task> {
    store
        .tasks()
        .into_iter()
        .find(|task| task.id == id)
        .ok_or(Error::TaskNotFound(id))
}

fn format_task_line(task: &Task) -> String {
    let marker = if task.is_done() {
        'x'
    } else if task.is_wont_do() {
        '-'
    } else if task.is_worked_on() {
        '>'
    } else if task.is_postponed() {
        'z'
    } else {
        ' '
    };

    let mut line = format!("#{} [{marker}] {}", task.id, task.title);
    if task.completion() > 0 && !task.is_done() {
        line.push_str(&format!(" ({}%)", task.completion()));
    }
    for tag in &task.tags {
        line.push_str(&format!(" +{tag}"));
    }
    if let Some(deadline) = &task.deadline {
        line.push_str(&format!(" due {}", deadline.format("%Y-%m-%d")));
    }
    line
}
