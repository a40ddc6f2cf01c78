//! HTTP access to the Tonight REST API.
//!
//! `Api` is the seam between store actions and the network: actions only
//! ever talk to the trait, so tests can swap in a scripted fake. `HttpApi`
//! is the reqwest implementation. Non-2xx responses are turned into
//! [`Error::Api`] carrying the body's `error` field when the server sent
//! one; that message is what failure notifications show to the user.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::events::Credentials;
use crate::filter::TaskFilter;
use crate::planning::Planning;
use crate::session::Session;
use crate::task::Task;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote operations the store dispatches to.
#[async_trait]
pub trait Api: Send + Sync {
    async fn me(&self) -> Result<Session>;
    async fn login(&self, credentials: &Credentials) -> Result<()>;
    async fn logout(&self) -> Result<()>;
    async fn customize_tag_colour(&self, tag: &str, colour: &str) -> Result<Session>;

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
    async fn create_task(&self, content: &str) -> Result<Task>;
    async fn update_task(&self, task_id: u64, content: &str) -> Result<Task>;
    async fn log_for_task(&self, task_id: u64, log: &str) -> Result<Task>;
    async fn delete_task(&self, task_id: u64) -> Result<()>;

    async fn current_planning(&self) -> Result<Option<Planning>>;
    async fn start_planning(&self, input: &str) -> Result<Planning>;
    async fn dismiss_planning(&self) -> Result<()>;
}

/// reqwest-backed implementation of [`Api`].
pub struct HttpApi {
    client: Client,
    base_url: String,
}

/// The task search endpoint wraps its results; an empty result may arrive
/// as a null list.
#[derive(Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Option<Vec<Task>>,
}

/// Error body shape for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("api url is empty".to_string()));
        }

        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-2xx responses to [`Error::Api`], keeping the server-supplied
    /// error message when the body carries one.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.error);

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn me(&self) -> Result<Session> {
        let response = self.client.get(self.url("/api/me")).send().await?;
        let mut session: Session = Self::check(response).await?.json().await?;
        session.loaded = true;
        Ok(session)
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(credentials)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let response = self.client.post(self.url("/api/logout")).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn customize_tag_colour(&self, tag: &str, colour: &str) -> Result<Session> {
        let response = self
            .client
            .post(self.url(&format!("/api/tags/{tag}")))
            .json(&serde_json::json!({ "colour": colour }))
            .send()
            .await?;
        let mut session: Session = Self::check(response).await?.json().await?;
        session.loaded = true;
        Ok(session)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let response = self
            .client
            .get(self.url("/api/tasks"))
            .query(&filter.to_query_pairs())
            .send()
            .await?;
        let envelope: TasksEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.tasks.unwrap_or_default())
    }

    async fn create_task(&self, content: &str) -> Result<Task> {
        let response = self
            .client
            .post(self.url("/api/tasks"))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_task(&self, task_id: u64, content: &str) -> Result<Task> {
        let response = self
            .client
            .post(self.url(&format!("/api/tasks/{task_id}")))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn log_for_task(&self, task_id: u64, log: &str) -> Result<Task> {
        let response = self
            .client
            .post(self.url(&format!("/api/tasks/{task_id}/log")))
            .json(&serde_json::json!({ "log": log }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_task(&self, task_id: u64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{task_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn current_planning(&self) -> Result<Option<Planning>> {
        let response = self.client.get(self.url("/api/planning")).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = Self::check(response).await?.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }

        let planning: Option<Planning> = serde_json::from_slice(&body)?;
        // The server answers with a zero plan when none is active
        Ok(planning.filter(|planning| planning.id != 0))
    }

    async fn start_planning(&self, input: &str) -> Result<Planning> {
        let response = self
            .client
            .post(self.url("/api/planning"))
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn dismiss_planning(&self) -> Result<()> {
        let response = self.client.delete(self.url("/api/planning")).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
