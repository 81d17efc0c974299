//! Remote service client: Google Tasks v1 and Google Calendar v3.
//!
//! The tool layer only sees the two capability traits below. `GoogleClient`
//! implements both over REST; tests substitute mocks or fakes.

pub mod auth;
pub mod client;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::types::RemoteError;

pub use auth::{CredentialSupplier, RefreshTokenSupplier, StaticToken};
pub use client::GoogleClient;

/// Result of a single remote call.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

// =============================================================================
// Request bodies
// =============================================================================

/// Body for inserting a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial task update. Only populated fields are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Event start or end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

/// Event body for insert (all fields set) or patch (only changed fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
}

/// Query parameters for listing events.
///
/// Recurring events are always expanded into instances and ordered by start
/// time, so those two parameters are fixed rather than fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEventsQuery {
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: u32,
}

impl ListEventsQuery {
    /// Upcoming-style listing: instances expanded, ascending by start time.
    pub fn expanded(max_results: u32) -> Self {
        Self {
            time_min: None,
            time_max: None,
            max_results,
        }
    }

    /// Query string pairs in the order they are sent.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(min) = &self.time_min {
            pairs.push(("timeMin", min.clone()));
        }
        if let Some(max) = &self.time_max {
            pairs.push(("timeMax", max.clone()));
        }
        pairs.push(("maxResults", self.max_results.to_string()));
        pairs.push(("singleEvents", "true".to_string()));
        pairs.push(("orderBy", "startTime".to_string()));
        pairs
    }
}

// =============================================================================
// Capability groups
// =============================================================================

/// Google Tasks operations. Payloads are passed through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskService: Send + Sync {
    /// `items` of the caller's task lists.
    async fn list_task_lists(&self) -> RemoteResult<Value>;

    /// `items` of the tasks in one list.
    async fn list_tasks(&self, tasklist_id: &str) -> RemoteResult<Value>;

    /// The created task resource.
    async fn insert_task(&self, tasklist_id: &str, task: &NewTask) -> RemoteResult<Value>;

    /// The updated task resource.
    async fn patch_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> RemoteResult<Value>;

    async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> RemoteResult<()>;
}

/// Google Calendar operations. Payloads are passed through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// `items` of the caller's calendar list.
    async fn list_calendars(&self) -> RemoteResult<Value>;

    /// `items` of the matching events.
    async fn list_events(&self, calendar_id: &str, query: &ListEventsQuery) -> RemoteResult<Value>;

    /// The created event resource.
    async fn insert_event(&self, calendar_id: &str, event: &EventWrite) -> RemoteResult<Value>;

    /// The updated event resource.
    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &EventWrite,
    ) -> RemoteResult<Value>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_task_patch_omits_absent_fields() {
        let patch = TaskPatch {
            id: "1".to_string(),
            title: None,
            notes: None,
            status: Some("completed".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"id": "1", "status": "completed"})
        );
    }

    #[test]
    fn test_event_write_field_order() {
        let event = EventWrite {
            summary: Some("Sync".to_string()),
            description: None,
            location: Some("Room 1".to_string()),
            start: Some(EventDateTime {
                date_time: "2025-06-10T09:00:00+08:00".to_string(),
                time_zone: "Asia/Kuala_Lumpur".to_string(),
            }),
            end: None,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"summary":"Sync","location":"Room 1","start":{"dateTime":"2025-06-10T09:00:00+08:00","timeZone":"Asia/Kuala_Lumpur"}}"#
        );
    }

    #[test]
    fn test_list_events_query_pairs() {
        let mut query = ListEventsQuery::expanded(10);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("maxResults", "10".to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ]
        );

        query.time_min = Some("2025-06-01T00:00:00Z".to_string());
        assert_eq!(query.to_pairs()[0], ("timeMin", "2025-06-01T00:00:00Z".to_string()));
    }

    proptest! {
        #[test]
        fn prop_event_patch_sends_only_given_fields(
            summary in proptest::option::of("[a-zA-Z ]{0,20}"),
            description in proptest::option::of("[a-zA-Z ]{0,20}"),
            location in proptest::option::of("[a-zA-Z0-9 ]{0,20}"),
            start in proptest::option::of("2025-0[1-9]-1[0-9]T09:00:00Z"),
        ) {
            let patch = EventWrite {
                summary: summary.clone(),
                description: description.clone(),
                location: location.clone(),
                start: start.clone().map(|date_time| EventDateTime {
                    date_time,
                    time_zone: "UTC".to_string(),
                }),
                end: None,
            };
            let value = serde_json::to_value(&patch).unwrap();
            let keys: Vec<&str> = value
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();

            let mut expected = Vec::new();
            if summary.is_some() { expected.push("summary"); }
            if description.is_some() { expected.push("description"); }
            if location.is_some() { expected.push("location"); }
            if start.is_some() { expected.push("start"); }
            prop_assert_eq!(keys, expected);
        }
    }
}
