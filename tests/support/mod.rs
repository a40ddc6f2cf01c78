use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tonight::api::Api;
use tonight::error::{Error, Result};
use tonight::events::Credentials;
use tonight::filter::TaskFilter;
use tonight::planning::Planning;
use tonight::session::Session;
use tonight::task::{Log, LogType, Task};

/// In-memory stand-in for the server. Records every call, serves data from
/// its own task list, and can be scripted to fail per endpoint.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, (u16, Option<String>)>>,
    session: Mutex<Option<Session>>,
    tasks: Mutex<Vec<Task>>,
    planning: Mutex<Option<Planning>>,
    next_task_id: Mutex<u64>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-authenticate with the given profile.
    pub fn with_session(self, session: Session) -> Self {
        *self.session.lock().expect("session lock") = Some(session);
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        {
            let mut guard = self.tasks.lock().expect("tasks lock");
            let mut next_id = self.next_task_id.lock().expect("id lock");
            *next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
            *guard = tasks;
        }
        self
    }

    pub fn with_planning(self, planning: Planning) -> Self {
        *self.planning.lock().expect("planning lock") = Some(planning);
        self
    }

    /// Script the named endpoint to fail with an API error.
    pub fn fail(&self, endpoint: &'static str, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(endpoint, (status, message.map(str::to_string)));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check(&self, endpoint: &'static str) -> Result<()> {
        if let Some((status, message)) = self
            .failures
            .lock()
            .expect("failures lock")
            .get(endpoint)
            .cloned()
        {
            return Err(Error::Api { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl Api for FakeApi {
    async fn me(&self) -> Result<Session> {
        self.record("me".to_string());
        self.check("me")?;
        match self.session.lock().expect("session lock").clone() {
            Some(mut session) => {
                session.loaded = true;
                Ok(session)
            }
            None => Err(Error::Api {
                status: 401,
                message: None,
            }),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.record(format!("login {}", credentials.username));
        self.check("login")?;
        let mut session = Session::anonymous();
        session.id = 1;
        session.name = credentials.username.clone();
        *self.session.lock().expect("session lock") = Some(session);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout".to_string());
        self.check("logout")?;
        *self.session.lock().expect("session lock") = None;
        Ok(())
    }

    async fn customize_tag_colour(&self, tag: &str, colour: &str) -> Result<Session> {
        self.record(format!("tag {tag}={colour}"));
        self.check("tag")?;
        let mut guard = self.session.lock().expect("session lock");
        match guard.as_mut() {
            Some(session) => {
                session
                    .tag_colours
                    .insert(tag.to_string(), colour.to_string());
                let mut session = session.clone();
                session.loaded = true;
                Ok(session)
            }
            None => Err(Error::Api {
                status: 401,
                message: None,
            }),
        }
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.record(format!("list_tasks {}", filter.to_query_string()));
        self.check("list_tasks")?;
        Ok(self.tasks.lock().expect("tasks lock").clone())
    }

    async fn create_task(&self, content: &str) -> Result<Task> {
        self.record(format!("create_task {content}"));
        self.check("create_task")?;
        let mut next_id = self.next_task_id.lock().expect("id lock");
        *next_id += 1;
        let task = make_task(*next_id, content);
        self.tasks.lock().expect("tasks lock").push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: u64, content: &str) -> Result<Task> {
        self.record(format!("update_task {task_id}"));
        self.check("update_task")?;
        let mut tasks = self.tasks.lock().expect("tasks lock");
        match tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                task.title = content.to_string();
                Ok(task.clone())
            }
            None => Err(Error::Api {
                status: 404,
                message: Some("task not found".to_string()),
            }),
        }
    }

    async fn log_for_task(&self, task_id: u64, log: &str) -> Result<Task> {
        self.record(format!("log_for_task {task_id} {log}"));
        self.check("log_for_task")?;
        let mut tasks = self.tasks.lock().expect("tasks lock");
        match tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                task.log.push(interpret_log(task, log));
                Ok(task.clone())
            }
            None => Err(Error::Api {
                status: 404,
                message: Some("task not found".to_string()),
            }),
        }
    }

    async fn delete_task(&self, task_id: u64) -> Result<()> {
        self.record(format!("delete_task {task_id}"));
        self.check("delete_task")?;
        self.tasks
            .lock()
            .expect("tasks lock")
            .retain(|task| task.id != task_id);
        Ok(())
    }

    async fn current_planning(&self) -> Result<Option<Planning>> {
        self.record("current_planning".to_string());
        self.check("current_planning")?;
        Ok(self.planning.lock().expect("planning lock").clone())
    }

    async fn start_planning(&self, input: &str) -> Result<Planning> {
        self.record(format!("start_planning {input}"));
        self.check("start_planning")?;
        let planning = Planning {
            id: 1,
            duration: input.to_string(),
            dismissed: false,
            started_at: Some(Utc::now()),
            tasks: self.tasks.lock().expect("tasks lock").clone(),
        };
        *self.planning.lock().expect("planning lock") = Some(planning.clone());
        Ok(planning)
    }

    async fn dismiss_planning(&self) -> Result<()> {
        self.record("dismiss_planning".to_string());
        self.check("dismiss_planning")?;
        *self.planning.lock().expect("planning lock") = None;
        Ok(())
    }
}

/// Minimal task value for seeding the fake.
pub fn make_task(id: u64, title: &str) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        priority: 0,
        rank: 0,
        tags: Vec::new(),
        duration: None,
        deadline: None,
        score: 0.0,
        log: Vec::new(),
        dependencies: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

pub fn make_session(id: u64, name: &str) -> Session {
    let mut session = Session::anonymous();
    session.id = id;
    session.name = name.to_string();
    session
}

/// The fake's log grammar: "done" completes, "start" and "pause" toggle
/// work, anything else is a comment.
fn interpret_log(task: &Task, log: &str) -> Log {
    let (log_type, completion) = match log {
        "done" => (LogType::Progress, 100),
        "start" => (LogType::Start, task.completion()),
        "pause" => (LogType::Pause, task.completion()),
        _ => (LogType::Comment, task.completion()),
    };
    Log {
        log_type,
        completion,
        description: log.to_string(),
        created_at: Utc::now(),
    }
}
