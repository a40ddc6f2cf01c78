//! Store composition layer.
//!
//! Aggregates the module state slices under one lock and wires the
//! cross-module subscriptions. Control flow is one-directional: a
//! dispatched action performs its HTTP call, commits mutations, and
//! committing consults the declarative trigger tables, which enqueue
//! background refresh actions. The queue is drained after the primary
//! action; background failures are logged and swallowed so one module's
//! refresh never breaks another module's flow.
//!
//! Mutation discipline is structural: the slices are private fields of
//! `AppState` and the only `&mut` path to them is `apply`, which runs
//! under the lock and never performs I/O. The lock is never held across
//! an await point.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::api::Api;
use crate::error::{Error, Result};
use crate::events::{Action, Credentials, Mutation, MutationKind};
use crate::filter::TaskFilter;
use crate::notifications::{Notification, NotificationKind, NotificationState, DEFAULT_HIDE_AFTER};
use crate::planning::{Planning, PlanningState};
use crate::session::Session;
use crate::task::Task;

/// Task list module state slice.
#[derive(Debug, Clone, Default)]
pub struct TaskListState {
    pub filter: TaskFilter,
    pub tasks: Vec<Task>,
    pub loading: bool,
    /// Ticket for in-flight fetches; responses carrying a stale ticket are
    /// dropped instead of overwriting newer results.
    pub fetch_seq: u64,
    /// The filter baseline serialized at fetch time, mirroring what a
    /// browser would show in its address bar.
    pub query_string: String,
}

/// All module slices, each owned exclusively by its module's mutations.
#[derive(Debug, Default)]
struct AppState {
    session: Session,
    tasks: TaskListState,
    planning: PlanningState,
    notifications: NotificationState,
}

impl AppState {
    /// The one synchronous state transition point. No I/O, total over every
    /// mutation.
    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SessionLoaded(session) => {
                self.session = session;
            }

            Mutation::QueryUpdated(q) => {
                self.tasks.filter.q = q;
            }
            Mutation::StatusFilterToggled(status) => {
                self.tasks.filter.toggle_status(status);
            }
            Mutation::SortOptionUpdated(sort_by) => {
                self.tasks.filter.sort_by = sort_by;
            }
            Mutation::FiltersLoaded(filter) => {
                self.tasks.filter = filter;
            }

            Mutation::TaskFetchingStarted => {
                self.tasks.fetch_seq += 1;
                self.tasks.loading = true;
            }
            Mutation::TasksReceived { seq, tasks, query } => {
                // A newer fetch has started since this response left; drop it
                if seq != self.tasks.fetch_seq {
                    return;
                }
                self.tasks.loading = false;
                self.tasks.tasks = tasks;
                self.tasks.query_string = query;
            }
            Mutation::TaskFetchingFailed { seq } => {
                if seq == self.tasks.fetch_seq {
                    self.tasks.loading = false;
                }
            }
            Mutation::TaskCreated(task) => {
                self.tasks.tasks.push(task);
            }
            Mutation::TaskUpdated(task) => {
                // Replace by identity with a fresh value, never in-place edits
                if let Some(slot) = self.tasks.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            Mutation::TaskDeleted(_) => {
                // No local removal: deletion triggers a full refetch instead
            }

            Mutation::PlanFetchingStarted => {
                self.planning.loading = true;
            }
            Mutation::PlanFetchingFailed => {
                self.planning.loading = false;
            }
            Mutation::PlanningReceived(planning) => {
                self.planning.loading = false;
                self.planning.planning = planning;
            }

            Mutation::NotificationPushed { kind, text } => {
                self.notifications.push(kind, text);
            }
            Mutation::NotificationRemoved(id) => {
                self.notifications.remove(id);
            }
        }
    }
}

/// Declarative cross-module subscription: committing a mutation whose kind
/// appears in `on` dispatches `action` as a background refresh.
pub struct Trigger {
    pub on: &'static [MutationKind],
    pub action: Action,
}

/// Session changes, filter changes, and deletions refetch the task list.
const TASK_LIST_TRIGGERS: Trigger = Trigger {
    on: &[
        MutationKind::SessionLoaded,
        MutationKind::QueryUpdated,
        MutationKind::StatusFilterToggled,
        MutationKind::SortOptionUpdated,
        MutationKind::FiltersLoaded,
        MutationKind::TaskDeleted,
    ],
    action: Action::FetchTasks,
};

/// The plan is derived from the task list; session and task changes refetch
/// it so it never goes stale.
const PLANNING_TRIGGERS: Trigger = Trigger {
    on: &[
        MutationKind::SessionLoaded,
        MutationKind::TaskCreated,
        MutationKind::TaskUpdated,
        MutationKind::TaskDeleted,
    ],
    action: Action::FetchPlan,
};

/// Every registered subscription, in one auditable place.
const TRIGGERS: &[&Trigger] = &[&TASK_LIST_TRIGGERS, &PLANNING_TRIGGERS];

/// Cloneable handle over the shared store.
#[derive(Clone)]
pub struct Store {
    api: Arc<dyn Api>,
    state: Arc<Mutex<AppState>>,
}

impl Store {
    pub fn new(api: Arc<dyn Api>) -> Self {
        Self::with_hide_after(api, DEFAULT_HIDE_AFTER)
    }

    pub fn with_hide_after(api: Arc<dyn Api>, hide_after: std::time::Duration) -> Self {
        let state = AppState {
            notifications: NotificationState::new(hide_after),
            ..AppState::default()
        };
        Self {
            api,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Dispatch an action: run it, then drain the background refreshes its
    /// mutations triggered. The primary action's error propagates; the
    /// background ones are logged and swallowed.
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        let mut queue = VecDeque::new();
        let result = self.run_action(action, &mut queue).await;

        while let Some(follow_up) = queue.pop_front() {
            let label = format!("{follow_up:?}");
            if let Err(err) = self.run_action(follow_up, &mut queue).await {
                warn!(action = %label, error = %err, "background refresh failed");
            }
        }

        result
    }

    // --- snapshot accessors -------------------------------------------------

    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.tasks.clone()
    }

    pub fn filter(&self) -> TaskFilter {
        self.lock().tasks.filter.clone()
    }

    /// The serialized filter baseline of the last completed fetch.
    pub fn query_string(&self) -> String {
        self.lock().tasks.query_string.clone()
    }

    pub fn tasks_loading(&self) -> bool {
        self.lock().tasks.loading
    }

    pub fn planning(&self) -> Option<Planning> {
        self.lock().planning.planning.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.notifications().to_vec()
    }

    // --- dispatch machinery -------------------------------------------------

    fn lock(&self) -> std::sync::MutexGuard<'_, AppState> {
        self.state.lock().expect("state lock")
    }

    /// Apply a mutation under the lock, read a value from the resulting
    /// state, then enqueue whatever the trigger tables match.
    fn commit_with<R>(
        &self,
        mutation: Mutation,
        queue: &mut VecDeque<Action>,
        read: impl FnOnce(&AppState) -> R,
    ) -> R {
        let kind = mutation.kind();
        let value = {
            let mut state = self.lock();
            state.apply(mutation);
            read(&state)
        };

        for trigger in TRIGGERS {
            if trigger.on.contains(&kind) {
                queue.push_back(trigger.action.clone());
            }
        }

        value
    }

    fn commit(&self, mutation: Mutation, queue: &mut VecDeque<Action>) {
        self.commit_with(mutation, queue, |_| ());
    }

    /// Push a notification and schedule its removal. The timer runs
    /// independently of the action flow and may fire after the target is
    /// already gone; removal is idempotent.
    fn notify(&self, kind: NotificationKind, text: String) {
        let mut queue = VecDeque::new();
        let (id, hide_after) = self.commit_with(
            Mutation::NotificationPushed { kind, text },
            &mut queue,
            |state| (state.notifications.last_id(), state.notifications.hide_after),
        );

        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(hide_after).await;
            let mut queue = VecDeque::new();
            store.commit(Mutation::NotificationRemoved(id), &mut queue);
        });
    }

    fn notify_failure(&self, context: &str, err: &Error) {
        self.notify(
            NotificationKind::Danger,
            format!("{context}: {}", err.user_message()),
        );
    }

    async fn run_action(&self, action: Action, queue: &mut VecDeque<Action>) -> Result<()> {
        match action {
            Action::LoadSession => self.load_session(queue).await,
            Action::Login(credentials) => self.login(credentials, queue).await,
            Action::Logout => self.logout(queue).await,
            Action::CustomizeTagColour { tag, colour } => {
                self.customize_tag_colour(&tag, &colour, queue).await
            }

            Action::FetchTasks => self.fetch_tasks(queue).await,
            Action::CreateTask { content } => self.create_task(&content, queue).await,
            Action::UpdateTask { task_id, content } => {
                self.update_task(task_id, &content, queue).await
            }
            Action::LogForTask { task_id, log } => self.log_for_task(task_id, &log, queue).await,
            Action::DeleteTask { task_id } => self.delete_task(task_id, queue).await,
            Action::UpdateQuery(q) => {
                self.commit(Mutation::QueryUpdated(q), queue);
                Ok(())
            }
            Action::ToggleStatusFilter(status) => {
                self.commit(Mutation::StatusFilterToggled(status), queue);
                Ok(())
            }
            Action::UpdateSortOption(sort_by) => {
                self.commit(Mutation::SortOptionUpdated(sort_by), queue);
                Ok(())
            }
            Action::LoadFiltersFromQuery(raw) => {
                let merged = self.filter().merge_query(&raw)?;
                self.commit(Mutation::FiltersLoaded(merged), queue);
                Ok(())
            }

            Action::FetchPlan => self.fetch_plan(queue).await,
            Action::StartPlan(input) => self.start_plan(&input, queue).await,
            Action::DismissPlan => self.dismiss_plan(queue).await,

            Action::NotifySuccess(text) => {
                self.notify(NotificationKind::Success, text);
                Ok(())
            }
            Action::NotifyFailure(text) => {
                self.notify(NotificationKind::Danger, text);
                Ok(())
            }
            Action::DismissNotification(id) => {
                self.commit(Mutation::NotificationRemoved(id), queue);
                Ok(())
            }
        }
    }

    // --- session ------------------------------------------------------------

    async fn load_session(&self, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.me().await {
            Ok(session) => {
                self.commit(Mutation::SessionLoaded(session), queue);
                Ok(())
            }
            // Not signed in is an expected terminal state, not a failure
            Err(err) if err.status() == Some(401) => {
                let mut session = Session::anonymous();
                session.loaded = true;
                self.commit(Mutation::SessionLoaded(session), queue);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn login(&self, credentials: Credentials, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.login(&credentials).await {
            Ok(()) => self.load_session(queue).await,
            Err(err) => {
                self.notify_failure("Error logging in", &err);
                Err(err)
            }
        }
    }

    async fn logout(&self, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.logout().await {
            Ok(()) => {
                self.commit(Mutation::SessionLoaded(Session::anonymous()), queue);
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Error logging out", &err);
                Err(err)
            }
        }
    }

    async fn customize_tag_colour(
        &self,
        tag: &str,
        colour: &str,
        queue: &mut VecDeque<Action>,
    ) -> Result<()> {
        match self.api.customize_tag_colour(tag, colour).await {
            // The server returns the full profile; replace it wholesale
            Ok(session) => {
                self.commit(Mutation::SessionLoaded(session), queue);
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Error saving custom tag colour", &err);
                Err(err)
            }
        }
    }

    // --- task list ----------------------------------------------------------

    async fn fetch_tasks(&self, queue: &mut VecDeque<Action>) -> Result<()> {
        let (seq, filter) = self.commit_with(Mutation::TaskFetchingStarted, queue, |state| {
            (state.tasks.fetch_seq, state.tasks.filter.clone())
        });

        match self.api.list_tasks(&filter).await {
            Ok(tasks) => {
                let query = filter.to_query_string();
                self.commit(Mutation::TasksReceived { seq, tasks, query }, queue);
                Ok(())
            }
            Err(err) => {
                self.commit(Mutation::TaskFetchingFailed { seq }, queue);
                warn!(error = %err, "task fetch failed");
                Err(err)
            }
        }
    }

    async fn create_task(&self, content: &str, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.create_task(content).await {
            Ok(task) => {
                self.commit(Mutation::TaskCreated(task), queue);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "task creation failed");
                Err(err)
            }
        }
    }

    async fn update_task(
        &self,
        task_id: u64,
        content: &str,
        queue: &mut VecDeque<Action>,
    ) -> Result<()> {
        match self.api.update_task(task_id, content).await {
            Ok(task) => {
                self.commit(Mutation::TaskUpdated(task), queue);
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Error updating task", &err);
                Err(err)
            }
        }
    }

    async fn log_for_task(
        &self,
        task_id: u64,
        log: &str,
        queue: &mut VecDeque<Action>,
    ) -> Result<()> {
        match self.api.log_for_task(task_id, log).await {
            Ok(task) => {
                let done = task.is_done();
                self.commit(Mutation::TaskUpdated(task), queue);
                if done {
                    // Completed tasks drop out of the default filtered view
                    queue.push_back(Action::FetchTasks);
                }
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Error logging for task", &err);
                Err(err)
            }
        }
    }

    async fn delete_task(&self, task_id: u64, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.delete_task(task_id).await {
            Ok(()) => {
                self.commit(Mutation::TaskDeleted(task_id), queue);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, task_id, "task deletion failed");
                Err(err)
            }
        }
    }

    // --- planning -----------------------------------------------------------

    async fn fetch_plan(&self, queue: &mut VecDeque<Action>) -> Result<()> {
        self.commit(Mutation::PlanFetchingStarted, queue);
        match self.api.current_planning().await {
            Ok(planning) => {
                self.commit(Mutation::PlanningReceived(planning), queue);
                Ok(())
            }
            Err(err) => {
                self.commit(Mutation::PlanFetchingFailed, queue);
                warn!(error = %err, "plan fetch failed");
                Err(err)
            }
        }
    }

    async fn start_plan(&self, input: &str, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.start_planning(input).await {
            Ok(planning) => {
                self.commit(Mutation::PlanningReceived(Some(planning)), queue);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "plan start failed");
                Err(err)
            }
        }
    }

    async fn dismiss_plan(&self, queue: &mut VecDeque<Action>) -> Result<()> {
        match self.api.dismiss_planning().await {
            Ok(()) => {
                self.commit(Mutation::PlanningReceived(None), queue);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "plan dismissal failed");
                Err(err)
            }
        }
    }
}
