//! Tool catalog: typed descriptors and JSON-Schema rendering for discovery.
//!
//! The catalog is built once at startup and never mutated. Each descriptor's
//! parameter list is also the contract the argument validator enforces.

use serde_json::{json, Map, Value};

use crate::tools::request::ToolName;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Enum(Vec<String>),
    Object,
}

impl ParamType {
    /// JSON-Schema `type` keyword for this parameter.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String | ParamType::Enum(_) => "string",
            ParamType::Number => "number",
            ParamType::Object => "object",
        }
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(self.param_type.json_type()));
        prop.insert("description".to_string(), json!(self.description));
        if let ParamType::Enum(variants) = &self.param_type {
            prop.insert("enum".to_string(), json!(variants));
        }
        Value::Object(prop)
    }
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Discovery metadata for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub tool: ToolName,
    pub description: String,
    pub parameters: Vec<ParamDef>,
}

impl ToolDescriptor {
    fn new(tool: ToolName, description: &str, parameters: Vec<ParamDef>) -> Self {
        Self {
            tool,
            description: description.to_string(),
            parameters,
        }
    }

    pub fn name(&self) -> &'static str {
        self.tool.as_str()
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamDef> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub fn has_required_params(&self) -> bool {
        self.required_params().next().is_some()
    }

    /// Render the parameter list as an object JSON Schema.
    ///
    /// Properties keep declaration order; `required` is omitted when empty.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.schema()))
            .collect();

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));

        let required: Vec<&str> = self.required_params().map(|p| p.name.as_str()).collect();
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        Value::Object(schema)
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// Immutable, ordered tool catalog.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// The Google Tasks and Calendar tools, tasks first.
    pub fn builtin() -> Self {
        let calendar_id = |description: &str| {
            ParamDef::optional("calendarId", ParamType::String, description)
        };

        let entries = vec![
            // Task tools
            ToolDescriptor::new(
                ToolName::ListTaskLists,
                "List all Google Task lists for the authenticated user.",
                vec![],
            ),
            ToolDescriptor::new(
                ToolName::ListTasks,
                "List tasks within a specific Google Task list.",
                vec![ParamDef::required(
                    "tasklistId",
                    ParamType::String,
                    "The ID of the task list to retrieve tasks from.",
                )],
            ),
            ToolDescriptor::new(
                ToolName::AddTask,
                "Add a new task to a specific Google Task list.",
                vec![
                    ParamDef::required(
                        "tasklistId",
                        ParamType::String,
                        "The ID of the task list to add the task to.",
                    ),
                    ParamDef::required("title", ParamType::String, "The title of the new task."),
                    ParamDef::optional("notes", ParamType::String, "Optional notes for the task."),
                ],
            ),
            ToolDescriptor::new(
                ToolName::UpdateTask,
                "Update an existing task in a Google Task list.",
                vec![
                    ParamDef::required(
                        "tasklistId",
                        ParamType::String,
                        "The ID of the task list containing the task.",
                    ),
                    ParamDef::required("taskId", ParamType::String, "The ID of the task to update."),
                    ParamDef::optional(
                        "title",
                        ParamType::String,
                        "The new title for the task (optional).",
                    ),
                    ParamDef::optional(
                        "notes",
                        ParamType::String,
                        "New notes for the task (optional).",
                    ),
                    ParamDef::optional(
                        "status",
                        ParamType::Enum(vec!["needsAction".to_string(), "completed".to_string()]),
                        "The status of the task (needsAction or completed) (optional).",
                    ),
                ],
            ),
            ToolDescriptor::new(
                ToolName::DeleteTask,
                "Delete a task from a Google Task list.",
                vec![
                    ParamDef::required(
                        "tasklistId",
                        ParamType::String,
                        "The ID of the task list containing the task.",
                    ),
                    ParamDef::required("taskId", ParamType::String, "The ID of the task to delete."),
                ],
            ),
            // Calendar tools
            ToolDescriptor::new(
                ToolName::ListCalendars,
                "List all Google Calendars for the authenticated user.",
                vec![],
            ),
            ToolDescriptor::new(
                ToolName::ListEvents,
                "List events from a specific Google Calendar.",
                vec![
                    calendar_id(
                        "The ID of the calendar to retrieve events from. Defaults to primary calendar.",
                    ),
                    ParamDef::optional(
                        "timeMin",
                        ParamType::String,
                        "Lower bound (inclusive) for an event's end time to filter by (RFC3339 timestamp).",
                    ),
                    ParamDef::optional(
                        "timeMax",
                        ParamType::String,
                        "Upper bound (exclusive) for an event's start time to filter by (RFC3339 timestamp).",
                    ),
                    ParamDef::optional(
                        "maxResults",
                        ParamType::Number,
                        "Maximum number of events returned. Default is 10.",
                    ),
                ],
            ),
            ToolDescriptor::new(
                ToolName::CreateEvent,
                "Create a new event in Google Calendar.",
                vec![
                    calendar_id(
                        "The ID of the calendar to create the event in. Defaults to primary calendar.",
                    ),
                    ParamDef::required(
                        "summary",
                        ParamType::String,
                        "The title/summary of the event.",
                    ),
                    ParamDef::optional(
                        "description",
                        ParamType::String,
                        "Description of the event.",
                    ),
                    ParamDef::required(
                        "startDateTime",
                        ParamType::String,
                        "Start date and time (RFC3339 format, e.g., \"2025-06-10T09:30:00+08:00\").",
                    ),
                    ParamDef::required(
                        "endDateTime",
                        ParamType::String,
                        "End date and time (RFC3339 format, e.g., \"2025-06-10T10:30:00+08:00\").",
                    ),
                    ParamDef::optional("location", ParamType::String, "Location of the event."),
                    ParamDef::optional(
                        "timeZone",
                        ParamType::String,
                        "Time zone for the event (e.g., \"Asia/Kuala_Lumpur\").",
                    ),
                ],
            ),
            ToolDescriptor::new(
                ToolName::UpdateEvent,
                "Update an existing event in Google Calendar.",
                vec![
                    calendar_id(
                        "The ID of the calendar containing the event. Defaults to primary calendar.",
                    ),
                    ParamDef::required("eventId", ParamType::String, "The ID of the event to update."),
                    ParamDef::optional(
                        "summary",
                        ParamType::String,
                        "The new title/summary of the event.",
                    ),
                    ParamDef::optional(
                        "description",
                        ParamType::String,
                        "New description of the event.",
                    ),
                    ParamDef::optional(
                        "startDateTime",
                        ParamType::String,
                        "New start date and time (RFC3339 format).",
                    ),
                    ParamDef::optional(
                        "endDateTime",
                        ParamType::String,
                        "New end date and time (RFC3339 format).",
                    ),
                    ParamDef::optional("location", ParamType::String, "New location of the event."),
                    ParamDef::optional("timeZone", ParamType::String, "Time zone for the event."),
                ],
            ),
            ToolDescriptor::new(
                ToolName::DeleteEvent,
                "Delete an event from Google Calendar.",
                vec![
                    calendar_id(
                        "The ID of the calendar containing the event. Defaults to primary calendar.",
                    ),
                    ParamDef::required("eventId", ParamType::String, "The ID of the event to delete."),
                ],
            ),
        ];

        Self { entries }
    }

    /// All descriptors in catalog order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.entries
    }

    /// Get a descriptor by tool.
    pub fn get(&self, tool: ToolName) -> Option<&ToolDescriptor> {
        self.entries.iter().find(|entry| entry.tool == tool)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_covers_every_tool_once() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(catalog.len(), ToolName::ALL.len());

        let names: HashSet<&str> = catalog.list().iter().map(|d| d.name()).collect();
        assert_eq!(names.len(), catalog.len(), "duplicate tool names");
        for tool in ToolName::ALL {
            assert!(catalog.get(tool).is_some(), "missing descriptor for {tool}");
        }
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let first: Vec<&str> = ToolCatalog::builtin().list().iter().map(|d| d.name()).collect();
        let second: Vec<&str> = ToolCatalog::builtin().list().iter().map(|d| d.name()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "list_task_lists");
        assert_eq!(first[5], "list_calendars");
        assert_eq!(first[9], "delete_event");
    }

    #[test]
    fn test_zero_argument_schema() {
        let catalog = ToolCatalog::builtin();
        let schema = catalog.get(ToolName::ListTaskLists).unwrap().input_schema();
        assert_eq!(schema, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn test_update_task_schema() {
        let catalog = ToolCatalog::builtin();
        let schema = catalog.get(ToolName::UpdateTask).unwrap().input_schema();

        assert_eq!(schema["required"], json!(["tasklistId", "taskId"]));
        assert_eq!(
            schema["properties"]["status"],
            json!({
                "type": "string",
                "description": "The status of the task (needsAction or completed) (optional).",
                "enum": ["needsAction", "completed"],
            })
        );

        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["tasklistId", "taskId", "title", "notes", "status"]);
    }

    #[test]
    fn test_list_events_has_no_required_fields() {
        let catalog = ToolCatalog::builtin();
        let descriptor = catalog.get(ToolName::ListEvents).unwrap();
        assert!(!descriptor.has_required_params());
        assert!(descriptor.input_schema().get("required").is_none());
        assert_eq!(descriptor.input_schema()["properties"]["maxResults"]["type"], "number");
    }

    #[test]
    fn test_param_schema_types() {
        let def = ParamDef::optional("extendedProperties", ParamType::Object, "Extra fields.");
        assert_eq!(def.schema(), json!({"type": "object", "description": "Extra fields."}));
        assert_eq!(ParamType::Enum(vec![]).json_type(), "string");
    }

    #[test]
    fn test_get_by_tool() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(catalog.get(ToolName::CreateEvent).unwrap().name(), "create_event");
        assert_eq!(catalog.get(ToolName::ListTaskLists).unwrap().required_params().count(), 0);
    }

    #[test]
    fn test_schemas_are_valid_json_schema() {
        for descriptor in ToolCatalog::builtin().list() {
            let schema = descriptor.input_schema();
            assert!(
                jsonschema::validator_for(&schema).is_ok(),
                "invalid schema for {}",
                descriptor.name()
            );
        }
    }

    #[test]
    fn test_create_event_schema_enforces_required() {
        let catalog = ToolCatalog::builtin();
        let schema = catalog.get(ToolName::CreateEvent).unwrap().input_schema();
        let validator = jsonschema::validator_for(&schema).unwrap();

        assert!(validator.is_valid(&json!({
            "summary": "Sync",
            "startDateTime": "2025-06-10T09:00:00+08:00",
            "endDateTime": "2025-06-10T10:00:00+08:00",
        })));
        assert!(!validator.is_valid(&json!({"summary": "Sync"})));
    }
}
