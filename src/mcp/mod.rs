//! MCP transport: JSON-RPC 2.0 over newline-delimited stdio.
//!
//! Stdout carries protocol frames only; everything else goes to stderr.

pub mod codec;
pub mod protocol;
pub mod router;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use router::route_request;
pub use server::McpServer;
