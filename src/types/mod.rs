//! Core types for the MCP server.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Server identity, tool defaults, Google endpoints and credentials

mod config;
mod errors;

pub use config::{
    Config, CredentialSource, GoogleConfig, ObservabilityConfig, ServerConfig, ToolDefaults,
};
pub use errors::{Error, ErrorKind, RemoteError, RemoteErrorKind, Result};
