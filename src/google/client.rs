//! REST client for Google Tasks v1 and Google Calendar v3.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::google::{
    CalendarService, CredentialSupplier, EventWrite, ListEventsQuery, NewTask, RemoteResult,
    TaskPatch, TaskService,
};
use crate::types::{Error, GoogleConfig, RemoteError, RemoteErrorKind, Result};

/// Build the shared HTTP client with the configured timeout.
pub fn http_client(config: &GoogleConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))
}

/// Authenticated handle to both capability groups.
///
/// Cheap to clone; the underlying connection pool and credential cache are
/// shared and safe for concurrent use.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSupplier>,
    tasks_base: Url,
    calendar_base: Url,
}

impl fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleClient")
            .field("tasks_base", &self.tasks_base.as_str())
            .field("calendar_base", &self.calendar_base.as_str())
            .finish_non_exhaustive()
    }
}

impl GoogleClient {
    pub fn new(
        config: &GoogleConfig,
        http: reqwest::Client,
        credentials: Arc<dyn CredentialSupplier>,
    ) -> Result<Self> {
        Ok(Self {
            http,
            credentials,
            tasks_base: parse_base(&config.tasks_base_url, "tasks_base_url")?,
            calendar_base: parse_base(&config.calendar_base_url, "calendar_base_url")?,
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send with a fresh bearer token; non-2xx becomes `RemoteError`.
    async fn execute(&self, request: RequestBuilder) -> RemoteResult<reqwest::Response> {
        let token = self.credentials.access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_http(status.as_u16(), &body))
    }

    async fn json(&self, request: RequestBuilder) -> RemoteResult<Value> {
        self.execute(request)
            .await?
            .json::<Value>()
            .await
            .map_err(transport_error)
    }

    /// Listing endpoints wrap results in `items`, omitted when empty.
    async fn items(&self, request: RequestBuilder) -> RemoteResult<Value> {
        let mut body = self.json(request).await?;
        Ok(match body.get_mut("items") {
            Some(items) if !items.is_null() => items.take(),
            _ => Value::Array(Vec::new()),
        })
    }

    async fn send_body<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> RemoteResult<Value> {
        self.json(self.request(method, url).json(body)).await
    }

    async fn delete(&self, url: Url) -> RemoteResult<()> {
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskService for GoogleClient {
    async fn list_task_lists(&self) -> RemoteResult<Value> {
        let url = endpoint(&self.tasks_base, &["users", "@me", "lists"])?;
        self.items(self.request(Method::GET, url)).await
    }

    async fn list_tasks(&self, tasklist_id: &str) -> RemoteResult<Value> {
        let url = endpoint(&self.tasks_base, &["lists", tasklist_id, "tasks"])?;
        self.items(self.request(Method::GET, url)).await
    }

    async fn insert_task(&self, tasklist_id: &str, task: &NewTask) -> RemoteResult<Value> {
        let url = endpoint(&self.tasks_base, &["lists", tasklist_id, "tasks"])?;
        self.send_body(Method::POST, url, task).await
    }

    async fn patch_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> RemoteResult<Value> {
        let url = endpoint(&self.tasks_base, &["lists", tasklist_id, "tasks", task_id])?;
        self.send_body(Method::PATCH, url, patch).await
    }

    async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> RemoteResult<()> {
        let url = endpoint(&self.tasks_base, &["lists", tasklist_id, "tasks", task_id])?;
        self.delete(url).await
    }
}

#[async_trait]
impl CalendarService for GoogleClient {
    async fn list_calendars(&self) -> RemoteResult<Value> {
        let url = endpoint(&self.calendar_base, &["users", "me", "calendarList"])?;
        self.items(self.request(Method::GET, url)).await
    }

    async fn list_events(&self, calendar_id: &str, query: &ListEventsQuery) -> RemoteResult<Value> {
        let url = endpoint(&self.calendar_base, &["calendars", calendar_id, "events"])?;
        let request = self.request(Method::GET, url).query(&query.to_pairs());
        self.items(request).await
    }

    async fn insert_event(&self, calendar_id: &str, event: &EventWrite) -> RemoteResult<Value> {
        let url = endpoint(&self.calendar_base, &["calendars", calendar_id, "events"])?;
        self.send_body(Method::POST, url, event).await
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &EventWrite,
    ) -> RemoteResult<Value> {
        let url = endpoint(&self.calendar_base, &["calendars", calendar_id, "events", event_id])?;
        self.send_body(Method::PATCH, url, patch).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> RemoteResult<()> {
        let url = endpoint(&self.calendar_base, &["calendars", calendar_id, "events", event_id])?;
        self.delete(url).await
    }
}

fn parse_base(raw: &str, field: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("invalid {field} '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{field} '{raw}' cannot be a base URL")));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL.
fn endpoint(base: &Url, segments: &[&str]) -> RemoteResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| RemoteError::new(RemoteErrorKind::Other, format!("invalid base URL {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    let kind = if err.is_decode() {
        RemoteErrorKind::Other
    } else {
        RemoteErrorKind::Unavailable
    };
    RemoteError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_and_encodes_segments() {
        let base = Url::parse("https://www.googleapis.com/calendar/v3/").unwrap();
        let url = endpoint(&base, &["calendars", "team#1@group.calendar.google.com", "events"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%231@group.calendar.google.com/events"
        );
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let base = Url::parse("https://tasks.googleapis.com/tasks/v1").unwrap();
        let url = endpoint(&base, &["users", "@me", "lists"]).unwrap();
        assert_eq!(url.as_str(), "https://tasks.googleapis.com/tasks/v1/users/@me/lists");
    }

    #[test]
    fn test_endpoint_encodes_slashes_in_ids() {
        let base = Url::parse("https://tasks.googleapis.com/tasks/v1/").unwrap();
        let url = endpoint(&base, &["lists", "a/b", "tasks"]).unwrap();
        assert_eq!(url.as_str(), "https://tasks.googleapis.com/tasks/v1/lists/a%2Fb/tasks");
    }

    #[test]
    fn test_parse_base_rejects_garbage() {
        assert!(parse_base("not a url", "tasks_base_url").is_err());
        assert!(parse_base("mailto:someone@example.com", "tasks_base_url").is_err());
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = GoogleConfig::default();
        let client = GoogleClient::new(
            &config,
            reqwest::Client::new(),
            Arc::new(crate::google::StaticToken::new("secret-token")),
        )
        .unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("tasks.googleapis.com"));
        assert!(!rendered.contains("secret-token"));
    }
}
