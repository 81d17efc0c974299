//! Closed set of tool names and their fully-resolved argument structures.
//!
//! The validator turns a loosely-typed argument bag into one `ToolRequest`
//! variant; the dispatcher matches on it exhaustively.

use std::fmt;
use std::str::FromStr;

use crate::google::EventDateTime;
use crate::types::Error;

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListTaskLists,
    ListTasks,
    AddTask,
    UpdateTask,
    DeleteTask,
    ListCalendars,
    ListEvents,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
}

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        ToolName::ListTaskLists,
        ToolName::ListTasks,
        ToolName::AddTask,
        ToolName::UpdateTask,
        ToolName::DeleteTask,
        ToolName::ListCalendars,
        ToolName::ListEvents,
        ToolName::CreateEvent,
        ToolName::UpdateEvent,
        ToolName::DeleteEvent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ListTaskLists => "list_task_lists",
            ToolName::ListTasks => "list_tasks",
            ToolName::AddTask => "add_task",
            ToolName::UpdateTask => "update_task",
            ToolName::DeleteTask => "delete_task",
            ToolName::ListCalendars => "list_calendars",
            ToolName::ListEvents => "list_events",
            ToolName::CreateEvent => "create_event",
            ToolName::UpdateEvent => "update_event",
            ToolName::DeleteEvent => "delete_event",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| Error::method_not_found(format!("Unknown tool: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksArgs {
    pub tasklist_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskArgs {
    pub tasklist_id: String,
    pub title: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskArgs {
    pub tasklist_id: String,
    pub task_id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    /// `needsAction` or `completed`; not checked locally.
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskArgs {
    pub tasklist_id: String,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEventsArgs {
    pub calendar_id: String,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventArgs {
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEventArgs {
    pub calendar_id: String,
    pub event_id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEventArgs {
    pub calendar_id: String,
    pub event_id: String,
}

/// A validated tool invocation with every default resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    ListTaskLists,
    ListTasks(ListTasksArgs),
    AddTask(AddTaskArgs),
    UpdateTask(UpdateTaskArgs),
    DeleteTask(DeleteTaskArgs),
    ListCalendars,
    ListEvents(ListEventsArgs),
    CreateEvent(CreateEventArgs),
    UpdateEvent(UpdateEventArgs),
    DeleteEvent(DeleteEventArgs),
}

impl ToolRequest {
    pub fn name(&self) -> ToolName {
        match self {
            ToolRequest::ListTaskLists => ToolName::ListTaskLists,
            ToolRequest::ListTasks(_) => ToolName::ListTasks,
            ToolRequest::AddTask(_) => ToolName::AddTask,
            ToolRequest::UpdateTask(_) => ToolName::UpdateTask,
            ToolRequest::DeleteTask(_) => ToolName::DeleteTask,
            ToolRequest::ListCalendars => ToolName::ListCalendars,
            ToolRequest::ListEvents(_) => ToolName::ListEvents,
            ToolRequest::CreateEvent(_) => ToolName::CreateEvent,
            ToolRequest::UpdateEvent(_) => ToolName::UpdateEvent,
            ToolRequest::DeleteEvent(_) => ToolName::DeleteEvent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
            assert_eq!(tool.to_string(), tool.as_str());
        }
    }

    #[test]
    fn test_unknown_name_is_method_not_found() {
        let err = "unknown_tool".parse::<ToolName>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotFound);
        assert_eq!(err.message(), "Unknown tool: unknown_tool");
    }

    #[test]
    fn test_name_lookup_is_case_sensitive() {
        assert!("List_Tasks".parse::<ToolName>().is_err());
    }
}
