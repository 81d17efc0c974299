//! Tool runtime: the single entry point the MCP layer calls.

use serde_json::Value;
use std::sync::Arc;

use crate::envelope::{OperationResult, ResponseEnvelope};
use crate::google::{CalendarService, TaskService};
use crate::tools::catalog::ToolCatalog;
use crate::tools::dispatch::Dispatcher;
use crate::tools::request::ToolName;
use crate::tools::validation::ArgumentValidator;
use crate::types::{Result, ToolDefaults};

/// Catalog, validator and dispatcher wired together.
#[derive(Debug, Clone)]
pub struct ToolRuntime {
    catalog: Arc<ToolCatalog>,
    validator: ArgumentValidator,
    dispatcher: Dispatcher,
}

impl ToolRuntime {
    pub fn new(
        tasks: Arc<dyn TaskService>,
        calendar: Arc<dyn CalendarService>,
        defaults: ToolDefaults,
    ) -> Self {
        let catalog = Arc::new(ToolCatalog::builtin());
        Self {
            validator: ArgumentValidator::new(Arc::clone(&catalog), defaults),
            dispatcher: Dispatcher::new(tasks, calendar),
            catalog,
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Run one tool call to an envelope.
    ///
    /// Only an unknown tool name is returned as `Err`; validation and remote
    /// failures come back as envelopes with `is_error` set.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<ResponseEnvelope> {
        let tool: ToolName = name.parse()?;

        let result = match self.validator.validate(tool, arguments.as_ref()) {
            Ok(request) => self.dispatcher.dispatch(request).await,
            Err(err) => {
                tracing::debug!(tool = %tool, "rejected arguments: {}", err.message());
                OperationResult::Failure(err)
            }
        };
        Ok(ResponseEnvelope::build(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::{MockCalendarService, MockTaskService};
    use crate::types::ErrorKind;
    use serde_json::json;

    fn runtime(tasks: MockTaskService) -> ToolRuntime {
        ToolRuntime::new(
            Arc::new(tasks),
            Arc::new(MockCalendarService::new()),
            ToolDefaults::default(),
        )
    }

    #[tokio::test]
    async fn test_unknown_tool_is_err() {
        let err = runtime(MockTaskService::new())
            .call("unknown_tool", Some(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotFound);
        assert_eq!(err.message(), "Unknown tool: unknown_tool");
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_remote_call() {
        // No expectations: any remote call would panic.
        let env = runtime(MockTaskService::new())
            .call("add_task", Some(json!({"tasklistId": "abc"})))
            .await
            .unwrap();
        assert!(env.is_error);
        assert_eq!(env.text(), "Error: Missing required parameter: title");
    }

    #[tokio::test]
    async fn test_valid_call_dispatches() {
        let mut tasks = MockTaskService::new();
        tasks
            .expect_list_task_lists()
            .times(1)
            .returning(|| Ok(json!([])));
        let env = runtime(tasks).call("list_task_lists", None).await.unwrap();
        assert!(!env.is_error);
        assert_eq!(env.text(), "[]");
    }

    #[test]
    fn test_catalog_is_builtin() {
        assert_eq!(runtime(MockTaskService::new()).catalog().len(), 10);
    }
}
