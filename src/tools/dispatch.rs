//! Operation dispatch: one validated request, exactly one remote call.

use std::fmt;
use std::sync::Arc;

use crate::envelope::{OperationResult, Payload};
use crate::google::{
    CalendarService, EventWrite, ListEventsQuery, NewTask, RemoteResult, TaskPatch,
    TaskService,
};
use crate::tools::request::ToolRequest;

/// Maps each `ToolRequest` onto the remote capability it needs.
///
/// Holds no per-call state; concurrent dispatches share the services.
#[derive(Clone)]
pub struct Dispatcher {
    tasks: Arc<dyn TaskService>,
    calendar: Arc<dyn CalendarService>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(tasks: Arc<dyn TaskService>, calendar: Arc<dyn CalendarService>) -> Self {
        Self { tasks, calendar }
    }

    pub async fn dispatch(&self, request: ToolRequest) -> OperationResult {
        let tool = request.name();
        tracing::debug!(tool = %tool, "dispatching tool call");

        match self.execute(request).await {
            Ok(payload) => OperationResult::Success(payload),
            Err(err) => {
                tracing::warn!(tool = %tool, kind = ?err.kind, "remote call failed: {}", err.message);
                OperationResult::Failure(err.into())
            }
        }
    }

    async fn execute(&self, request: ToolRequest) -> RemoteResult<Payload> {
        let payload = match request {
            ToolRequest::ListTaskLists => Payload::Json(self.tasks.list_task_lists().await?),
            ToolRequest::ListTasks(args) => {
                Payload::Json(self.tasks.list_tasks(&args.tasklist_id).await?)
            }
            ToolRequest::AddTask(args) => {
                let task = NewTask {
                    title: args.title,
                    notes: args.notes,
                };
                Payload::Json(self.tasks.insert_task(&args.tasklist_id, &task).await?)
            }
            ToolRequest::UpdateTask(args) => {
                let patch = TaskPatch {
                    id: args.task_id.clone(),
                    title: args.title,
                    notes: args.notes,
                    status: args.status,
                };
                Payload::Json(
                    self.tasks
                        .patch_task(&args.tasklist_id, &args.task_id, &patch)
                        .await?,
                )
            }
            ToolRequest::DeleteTask(args) => {
                self.tasks.delete_task(&args.tasklist_id, &args.task_id).await?;
                Payload::Text(format!(
                    "Task {} deleted successfully from task list {}.",
                    args.task_id, args.tasklist_id
                ))
            }
            ToolRequest::ListCalendars => Payload::Json(self.calendar.list_calendars().await?),
            ToolRequest::ListEvents(args) => {
                let query = ListEventsQuery {
                    time_min: args.time_min,
                    time_max: args.time_max,
                    max_results: args.max_results,
                };
                Payload::Json(self.calendar.list_events(&args.calendar_id, &query).await?)
            }
            ToolRequest::CreateEvent(args) => {
                let event = EventWrite {
                    summary: Some(args.summary),
                    description: args.description,
                    location: args.location,
                    start: Some(args.start),
                    end: Some(args.end),
                };
                Payload::Json(self.calendar.insert_event(&args.calendar_id, &event).await?)
            }
            ToolRequest::UpdateEvent(args) => {
                let patch = EventWrite {
                    summary: args.summary,
                    description: args.description,
                    location: args.location,
                    start: args.start,
                    end: args.end,
                };
                Payload::Json(
                    self.calendar
                        .patch_event(&args.calendar_id, &args.event_id, &patch)
                        .await?,
                )
            }
            ToolRequest::DeleteEvent(args) => {
                self.calendar.delete_event(&args.calendar_id, &args.event_id).await?;
                Payload::Text(format!(
                    "Event {} deleted successfully from calendar {}.",
                    args.event_id, args.calendar_id
                ))
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ResponseEnvelope;
    use crate::google::{EventDateTime, MockCalendarService, MockTaskService};
    use crate::tools::request::{
        AddTaskArgs, CreateEventArgs, DeleteEventArgs, DeleteTaskArgs, ListEventsArgs,
        ListTasksArgs, UpdateEventArgs, UpdateTaskArgs,
    };
    use crate::types::{RemoteError, RemoteErrorKind};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use tracing_test::traced_test;

    fn dispatcher(tasks: MockTaskService, calendar: MockCalendarService) -> Dispatcher {
        Dispatcher::new(Arc::new(tasks), Arc::new(calendar))
    }

    fn zone(date_time: &str) -> EventDateTime {
        EventDateTime {
            date_time: date_time.to_string(),
            time_zone: "Asia/Kuala_Lumpur".to_string(),
        }
    }

    fn success_value(result: OperationResult) -> Value {
        match result {
            OperationResult::Success(Payload::Json(v)) => v,
            other => panic!("expected JSON success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_task_lists_passes_items_through() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_list_task_lists()
            .times(1)
            .returning(|| Ok(json!([{"id": "abc", "title": "My Tasks"}])));

        let result = dispatcher(tasks, MockCalendarService::new())
            .dispatch(ToolRequest::ListTaskLists)
            .await;
        assert_eq!(success_value(result), json!([{"id": "abc", "title": "My Tasks"}]));
    }

    #[tokio::test]
    async fn test_list_tasks_uses_list_id() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_list_tasks()
            .withf(|id: &str| id == "abc")
            .times(1)
            .returning(|_| Ok(json!([])));

        let result = dispatcher(tasks, MockCalendarService::new())
            .dispatch(ToolRequest::ListTasks(ListTasksArgs {
                tasklist_id: "abc".to_string(),
            }))
            .await;
        assert_eq!(ResponseEnvelope::build(result).text(), "[]");
    }

    #[tokio::test]
    async fn test_add_task_sends_title_only() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_insert_task()
            .withf(|id: &str, task: &NewTask| {
                id == "abc" && task.title == "Buy milk" && task.notes.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(json!({"id": "t1", "title": "Buy milk"})));

        let result = dispatcher(tasks, MockCalendarService::new())
            .dispatch(ToolRequest::AddTask(AddTaskArgs {
                tasklist_id: "abc".to_string(),
                title: "Buy milk".to_string(),
                notes: None,
            }))
            .await;
        assert_eq!(success_value(result), json!({"id": "t1", "title": "Buy milk"}));
    }

    #[tokio::test]
    async fn test_update_task_patches_only_given_fields() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_patch_task()
            .withf(|list: &str, id: &str, patch: &TaskPatch| {
                list == "abc"
                    && id == "t1"
                    && *patch
                        == TaskPatch {
                            id: "t1".to_string(),
                            title: None,
                            notes: None,
                            status: Some("completed".to_string()),
                        }
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({"id": "t1", "title": "Buy milk", "status": "completed"})));

        let result = dispatcher(tasks, MockCalendarService::new())
            .dispatch(ToolRequest::UpdateTask(UpdateTaskArgs {
                tasklist_id: "abc".to_string(),
                task_id: "t1".to_string(),
                title: None,
                notes: None,
                status: Some("completed".to_string()),
            }))
            .await;
        assert_eq!(success_value(result)["title"], "Buy milk");
    }

    #[tokio::test]
    async fn test_delete_task_confirmation_text() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_delete_task()
            .withf(|list: &str, id: &str| list == "abc" && id == "t1")
            .times(1)
            .returning(|_, _| Ok(()));

        let result = dispatcher(tasks, MockCalendarService::new())
            .dispatch(ToolRequest::DeleteTask(DeleteTaskArgs {
                tasklist_id: "abc".to_string(),
                task_id: "t1".to_string(),
            }))
            .await;
        let env = ResponseEnvelope::build(result);
        assert!(!env.is_error);
        assert_eq!(env.text(), "Task t1 deleted successfully from task list abc.");
    }

    #[tokio::test]
    async fn test_list_events_expands_and_orders() {
        let mut calendar = MockCalendarService::new();
        calendar
            .expect_list_events()
            .withf(|id: &str, query: &ListEventsQuery| {
                id == "primary"
                    && query.max_results == 10
                    && query.to_pairs().contains(&("singleEvents", "true".to_string()))
                    && query.to_pairs().contains(&("orderBy", "startTime".to_string()))
                    && query.time_min.as_deref() == Some("2025-06-01T00:00:00Z")
                    && query.time_max.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(json!([{"id": "e1"}])));

        let result = dispatcher(MockTaskService::new(), calendar)
            .dispatch(ToolRequest::ListEvents(ListEventsArgs {
                calendar_id: "primary".to_string(),
                time_min: Some("2025-06-01T00:00:00Z".to_string()),
                time_max: None,
                max_results: 10,
            }))
            .await;
        assert_eq!(success_value(result), json!([{"id": "e1"}]));
    }

    #[tokio::test]
    async fn test_create_event_sends_full_body() {
        let mut calendar = MockCalendarService::new();
        calendar
            .expect_insert_event()
            .withf(|id: &str, event: &EventWrite| {
                id == "primary"
                    && event.summary.as_deref() == Some("Sync")
                    && event.start == Some(zone("2025-06-10T09:00:00+08:00"))
                    && event.end == Some(zone("2025-06-10T10:00:00+08:00"))
            })
            .times(1)
            .returning(|_, _| Ok(json!({"id": "e1", "summary": "Sync"})));

        let result = dispatcher(MockTaskService::new(), calendar)
            .dispatch(ToolRequest::CreateEvent(CreateEventArgs {
                calendar_id: "primary".to_string(),
                summary: "Sync".to_string(),
                description: None,
                location: None,
                start: zone("2025-06-10T09:00:00+08:00"),
                end: zone("2025-06-10T10:00:00+08:00"),
            }))
            .await;
        assert_eq!(success_value(result)["id"], "e1");
    }

    #[tokio::test]
    async fn test_update_event_leaves_start_untouched() {
        let mut calendar = MockCalendarService::new();
        calendar
            .expect_patch_event()
            .withf(|cal: &str, id: &str, patch: &EventWrite| {
                cal == "primary"
                    && id == "e1"
                    && patch.start.is_none()
                    && patch.end == Some(zone("2025-06-10T11:00:00+08:00"))
                    && patch.summary.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({"id": "e1"})));

        let result = dispatcher(MockTaskService::new(), calendar)
            .dispatch(ToolRequest::UpdateEvent(UpdateEventArgs {
                calendar_id: "primary".to_string(),
                event_id: "e1".to_string(),
                summary: None,
                description: None,
                location: None,
                start: None,
                end: Some(zone("2025-06-10T11:00:00+08:00")),
            }))
            .await;
        assert!(result.is_success());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_remote_failure_becomes_error_envelope() {
        let mut calendar = MockCalendarService::new();
        calendar
            .expect_delete_event()
            .times(1)
            .returning(|_, _| Err(RemoteError::new(RemoteErrorKind::NotFound, "Not Found")));

        let result = dispatcher(MockTaskService::new(), calendar)
            .dispatch(ToolRequest::DeleteEvent(DeleteEventArgs {
                calendar_id: "primary".to_string(),
                event_id: "nope".to_string(),
            }))
            .await;
        let env = ResponseEnvelope::build(result);
        assert!(env.is_error);
        assert_eq!(env.text(), "Error: Not Found");
        assert!(logs_contain("remote call failed"));
    }

    proptest! {
        #[test]
        fn prop_delete_event_names_both_ids(
            calendar_id in "[a-zA-Z0-9@._-]{1,40}",
            event_id in "[a-z0-9]{1,30}",
        ) {
            let mut calendar = MockCalendarService::new();
            calendar.expect_delete_event().times(1).returning(|_, _| Ok(()));
            let dispatcher = dispatcher(MockTaskService::new(), calendar);

            let result = tokio_test::block_on(dispatcher.dispatch(ToolRequest::DeleteEvent(
                DeleteEventArgs {
                    calendar_id: calendar_id.clone(),
                    event_id: event_id.clone(),
                },
            )));
            let env = ResponseEnvelope::build(result);
            prop_assert!(!env.is_error);
            prop_assert_eq!(
                env.text(),
                format!("Event {event_id} deleted successfully from calendar {calendar_id}.")
            );
        }
    }
}
