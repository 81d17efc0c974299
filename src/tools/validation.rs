//! Argument validation: gates every tool call before any remote request.
//!
//! Checks the argument bag against the tool's descriptor, then resolves
//! defaults so the dispatcher always receives a complete `ToolRequest`.
//!
//! A JSON `null` is treated exactly like an absent field: it is never an
//! instruction to clear a remote value. Unknown fields are ignored.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::google::EventDateTime;
use crate::tools::catalog::ToolCatalog;
use crate::tools::request::{
    AddTaskArgs, CreateEventArgs, DeleteEventArgs, DeleteTaskArgs, ListEventsArgs, ListTasksArgs,
    ToolName, ToolRequest, UpdateEventArgs, UpdateTaskArgs,
};
use crate::types::{Error, Result, ToolDefaults};

/// Validates raw arguments and resolves per-tool defaults.
#[derive(Debug, Clone)]
pub struct ArgumentValidator {
    catalog: Arc<ToolCatalog>,
    defaults: ToolDefaults,
}

impl ArgumentValidator {
    pub fn new(catalog: Arc<ToolCatalog>, defaults: ToolDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Turn a raw argument bag into a resolved request.
    pub fn validate(&self, tool: ToolName, arguments: Option<&Value>) -> Result<ToolRequest> {
        let descriptor = self
            .catalog
            .get(tool)
            .ok_or_else(|| Error::method_not_found(format!("Unknown tool: {tool}")))?;

        let empty = Map::new();
        let map = match arguments {
            None | Some(Value::Null) if descriptor.has_required_params() => {
                return Err(Error::invalid_params(format!("Missing arguments for {tool}")));
            }
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(Error::invalid_params(format!(
                    "Arguments for {tool} must be an object, got {}",
                    value_type_name(other)
                )));
            }
        };

        for param in descriptor.required_params() {
            if !is_present(map, &param.name) {
                return Err(Error::invalid_params(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        let args = Fields { map };
        let request = match tool {
            ToolName::ListTaskLists => ToolRequest::ListTaskLists,
            ToolName::ListTasks => ToolRequest::ListTasks(ListTasksArgs {
                tasklist_id: args.required_str("tasklistId")?,
            }),
            ToolName::AddTask => ToolRequest::AddTask(AddTaskArgs {
                tasklist_id: args.required_str("tasklistId")?,
                title: args.required_str("title")?,
                notes: args.optional_str("notes")?,
            }),
            ToolName::UpdateTask => ToolRequest::UpdateTask(UpdateTaskArgs {
                tasklist_id: args.required_str("tasklistId")?,
                task_id: args.required_str("taskId")?,
                title: args.optional_str("title")?,
                notes: args.optional_str("notes")?,
                status: args.optional_str("status")?,
            }),
            ToolName::DeleteTask => ToolRequest::DeleteTask(DeleteTaskArgs {
                tasklist_id: args.required_str("tasklistId")?,
                task_id: args.required_str("taskId")?,
            }),
            ToolName::ListCalendars => ToolRequest::ListCalendars,
            ToolName::ListEvents => ToolRequest::ListEvents(ListEventsArgs {
                calendar_id: self.calendar_id(&args)?,
                time_min: args.optional_str("timeMin")?,
                time_max: args.optional_str("timeMax")?,
                max_results: args
                    .positive_int("maxResults")
                    .unwrap_or(self.defaults.default_max_results),
            }),
            ToolName::CreateEvent => {
                let time_zone = self.time_zone(&args)?;
                ToolRequest::CreateEvent(CreateEventArgs {
                    calendar_id: self.calendar_id(&args)?,
                    summary: args.required_str("summary")?,
                    description: args.optional_str("description")?,
                    location: args.optional_str("location")?,
                    start: EventDateTime {
                        date_time: args.required_str("startDateTime")?,
                        time_zone: time_zone.clone(),
                    },
                    end: EventDateTime {
                        date_time: args.required_str("endDateTime")?,
                        time_zone,
                    },
                })
            }
            ToolName::UpdateEvent => {
                let time_zone = self.time_zone(&args)?;
                let at = |date_time: String| EventDateTime {
                    date_time,
                    time_zone: time_zone.clone(),
                };
                ToolRequest::UpdateEvent(UpdateEventArgs {
                    calendar_id: self.calendar_id(&args)?,
                    event_id: args.required_str("eventId")?,
                    summary: args.optional_str("summary")?,
                    description: args.optional_str("description")?,
                    location: args.optional_str("location")?,
                    start: args.optional_str("startDateTime")?.map(at),
                    end: args.optional_str("endDateTime")?.map(at),
                })
            }
            ToolName::DeleteEvent => ToolRequest::DeleteEvent(DeleteEventArgs {
                calendar_id: self.calendar_id(&args)?,
                event_id: args.required_str("eventId")?,
            }),
        };

        Ok(request)
    }

    fn calendar_id(&self, args: &Fields<'_>) -> Result<String> {
        Ok(args
            .non_empty_str("calendarId")?
            .unwrap_or_else(|| self.defaults.default_calendar_id.clone()))
    }

    fn time_zone(&self, args: &Fields<'_>) -> Result<String> {
        Ok(args
            .non_empty_str("timeZone")?
            .unwrap_or_else(|| self.defaults.default_time_zone.clone()))
    }
}

/// Typed accessors over one argument object.
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl Fields<'_> {
    /// Strings pass through; other scalars are sent as their JSON text and
    /// left for the remote service to judge.
    fn optional_str(&self, key: &str) -> Result<Option<String>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
            Some(other) => Err(Error::invalid_params(format!(
                "Parameter '{}': expected string, got {}",
                key,
                value_type_name(other)
            ))),
        }
    }

    fn required_str(&self, key: &str) -> Result<String> {
        self.optional_str(key)?
            .ok_or_else(|| Error::invalid_params(format!("Missing required parameter: {key}")))
    }

    /// Like `optional_str`, but an empty string also counts as absent.
    fn non_empty_str(&self, key: &str) -> Result<Option<String>> {
        Ok(self.optional_str(key)?.filter(|s| !s.is_empty()))
    }

    /// Positive integer from a number or numeric string; anything else
    /// (including zero) yields `None`.
    fn positive_int(&self, key: &str) -> Option<u32> {
        let n = match self.map.get(key)? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 1.0)
                    .map(|f| f.trunc() as u64)
            })?,
            Value::String(s) => s.trim().parse::<u64>().ok()?,
            _ => return None,
        };
        u32::try_from(n).ok().filter(|n| *n > 0)
    }
}

fn is_present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|v| !v.is_null())
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
