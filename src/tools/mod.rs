//! Tool layer between the MCP router and the Google client.
//!
//! A call flows name → `ToolName` → validated `ToolRequest` → one remote
//! operation → `ResponseEnvelope`.

pub mod catalog;
pub mod dispatch;
pub mod request;
pub mod runtime;
pub mod validation;

pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolDescriptor};
pub use dispatch::Dispatcher;
pub use request::{ToolName, ToolRequest};
pub use runtime::ToolRuntime;
pub use validation::ArgumentValidator;
