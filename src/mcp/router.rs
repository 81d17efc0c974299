//! MCP method router: routes by JSON-RPC method, delegates to the tool runtime.

use serde_json::{json, Value};

use crate::mcp::protocol::{
    empty_object, CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ServerInfo, ToolInfo, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::tools::ToolRuntime;
use crate::types::ServerConfig;

/// Route one request. Returns `None` for notifications, which never get a reply.
pub async fn route_request(
    runtime: &ToolRuntime,
    server: &ServerConfig,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "notification received");
        return None;
    };

    if request.jsonrpc != crate::mcp::protocol::JSONRPC_VERSION {
        return Some(JsonRpcResponse::failure(
            id,
            JsonRpcError::new(
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", request.jsonrpc),
            ),
        ));
    }

    let response = match handle(runtime, server, &request.method, request.params).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    };
    Some(response)
}

async fn handle(
    runtime: &ToolRuntime,
    server: &ServerConfig,
    method: &str,
    params: Option<Value>,
) -> Result<Value, JsonRpcError> {
    match method {
        "initialize" => to_value(&InitializeResult {
            protocol_version: server.protocol_version.clone(),
            capabilities: json!({ "tools": empty_object() }),
            server_info: ServerInfo {
                name: server.name.clone(),
                version: server.version.clone(),
            },
        }),
        "ping" => Ok(empty_object()),
        "tools/list" => list_tools(runtime),
        "tools/call" => call_tool(runtime, params).await,
        m if m.starts_with("notifications/") => Ok(empty_object()),
        _ => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )),
    }
}

fn list_tools(runtime: &ToolRuntime) -> Result<Value, JsonRpcError> {
    let tools: Vec<ToolInfo> = runtime
        .catalog()
        .list()
        .iter()
        .map(|descriptor| ToolInfo {
            name: descriptor.name().to_string(),
            description: descriptor.description.clone(),
            input_schema: descriptor.input_schema(),
        })
        .collect();
    Ok(json!({ "tools": tools }))
}

async fn call_tool(runtime: &ToolRuntime, params: Option<Value>) -> Result<Value, JsonRpcError> {
    let params: CallToolParams = params
        .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing params for tools/call"))
        .and_then(|p| {
            serde_json::from_value(p).map_err(|e| {
                JsonRpcError::new(INVALID_PARAMS, format!("Invalid tools/call params: {}", e))
            })
        })?;

    let envelope = runtime.call(&params.name, params.arguments).await?;
    to_value(&envelope)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| crate::types::Error::from(e).into())
}
