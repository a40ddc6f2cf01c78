//! Event catalog: every cross-module interaction is a named event.
//!
//! Two channels exist. Actions are requested operations, potentially
//! asynchronous (HTTP), and may fail; an action may commit mutations and
//! enqueue further actions. Mutations are synchronous, total state
//! transitions that only touch their own module's slice and never perform
//! I/O. `MutationKind` is the payload-free discriminant the trigger tables
//! match on.

use crate::filter::{SortOption, TaskFilter, TaskStatus};
use crate::notifications::NotificationKind;
use crate::planning::Planning;
use crate::session::Session;
use crate::task::Task;

/// Login credentials posted to the API.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Requested operations, dispatched by the UI or by trigger tables.
#[derive(Debug, Clone)]
pub enum Action {
    // Session
    LoadSession,
    Login(Credentials),
    Logout,
    CustomizeTagColour { tag: String, colour: String },

    // Task list
    FetchTasks,
    CreateTask { content: String },
    UpdateTask { task_id: u64, content: String },
    LogForTask { task_id: u64, log: String },
    DeleteTask { task_id: u64 },
    UpdateQuery(String),
    ToggleStatusFilter(TaskStatus),
    UpdateSortOption(Option<SortOption>),
    LoadFiltersFromQuery(String),

    // Planning
    FetchPlan,
    StartPlan(String),
    DismissPlan,

    // Notifications
    NotifySuccess(String),
    NotifyFailure(String),
    DismissNotification(u64),
}

/// Committed state transitions.
#[derive(Debug, Clone)]
pub enum Mutation {
    // Session
    SessionLoaded(Session),

    // Task list filters
    QueryUpdated(String),
    StatusFilterToggled(TaskStatus),
    SortOptionUpdated(Option<SortOption>),
    FiltersLoaded(TaskFilter),

    // Task list
    TaskFetchingStarted,
    TasksReceived {
        seq: u64,
        tasks: Vec<Task>,
        query: String,
    },
    TaskFetchingFailed {
        seq: u64,
    },
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskDeleted(u64),

    // Planning
    PlanFetchingStarted,
    PlanFetchingFailed,
    PlanningReceived(Option<Planning>),

    // Notifications
    NotificationPushed {
        kind: NotificationKind,
        text: String,
    },
    NotificationRemoved(u64),
}

/// Payload-free mutation discriminants for trigger tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    SessionLoaded,
    QueryUpdated,
    StatusFilterToggled,
    SortOptionUpdated,
    FiltersLoaded,
    TaskFetchingStarted,
    TasksReceived,
    TaskFetchingFailed,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    PlanFetchingStarted,
    PlanFetchingFailed,
    PlanningReceived,
    NotificationPushed,
    NotificationRemoved,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::SessionLoaded(_) => MutationKind::SessionLoaded,
            Mutation::QueryUpdated(_) => MutationKind::QueryUpdated,
            Mutation::StatusFilterToggled(_) => MutationKind::StatusFilterToggled,
            Mutation::SortOptionUpdated(_) => MutationKind::SortOptionUpdated,
            Mutation::FiltersLoaded(_) => MutationKind::FiltersLoaded,
            Mutation::TaskFetchingStarted => MutationKind::TaskFetchingStarted,
            Mutation::TasksReceived { .. } => MutationKind::TasksReceived,
            Mutation::TaskFetchingFailed { .. } => MutationKind::TaskFetchingFailed,
            Mutation::TaskCreated(_) => MutationKind::TaskCreated,
            Mutation::TaskUpdated(_) => MutationKind::TaskUpdated,
            Mutation::TaskDeleted(_) => MutationKind::TaskDeleted,
            Mutation::PlanFetchingStarted => MutationKind::PlanFetchingStarted,
            Mutation::PlanFetchingFailed => MutationKind::PlanFetchingFailed,
            Mutation::PlanningReceived(_) => MutationKind::PlanningReceived,
            Mutation::NotificationPushed { .. } => MutationKind::NotificationPushed,
            Mutation::NotificationRemoved(_) => MutationKind::NotificationRemoved,
        }
    }
}
