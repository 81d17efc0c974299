//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Remote
//! failures keep the upstream message verbatim so callers see exactly what
//! Google reported.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Caller-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Required argument missing or argument bag absent.
    InvalidParams,
    /// Unknown tool or protocol method.
    MethodNotFound,
    /// Any failure surfaced by the remote service client.
    RemoteOperationFailed,
    /// Local failures unrelated to the caller's request.
    Internal,
}

/// Cause of a remote failure, derived from the upstream status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    AuthExpired,
    NotFound,
    InvalidArgument,
    RateLimited,
    Unavailable,
    Other,
}

impl RemoteErrorKind {
    /// Classify an HTTP status. `reason` is Google's `errors[0].reason`, used
    /// to tell quota 403s apart from permission 403s.
    pub fn from_status(status: u16, reason: Option<&str>) -> Self {
        match status {
            400 => RemoteErrorKind::InvalidArgument,
            401 => RemoteErrorKind::AuthExpired,
            403 => match reason {
                Some("rateLimitExceeded" | "userRateLimitExceeded" | "quotaExceeded") => {
                    RemoteErrorKind::RateLimited
                }
                _ => RemoteErrorKind::AuthExpired,
            },
            404 | 410 => RemoteErrorKind::NotFound,
            429 => RemoteErrorKind::RateLimited,
            500..=599 => RemoteErrorKind::Unavailable,
            _ => RemoteErrorKind::Other,
        }
    }
}

/// Failure reported by the remote calendar/task service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build from a non-2xx response body.
    ///
    /// Understands the Google API error shape
    /// (`{"error": {"code", "message", "errors": [{"reason"}]}}`) and the OAuth
    /// token endpoint shape (`{"error": "...", "error_description": "..."}`).
    /// Falls back to a generic status message when the body is not JSON.
    pub fn from_http(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let reason = error
            .and_then(|e| e.get("errors"))
            .and_then(|errs| errs.get(0))
            .and_then(|first| first.get("reason"))
            .and_then(Value::as_str);

        let message = match error {
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            Some(Value::String(code)) => {
                let description = parsed
                    .as_ref()
                    .and_then(|v| v.get("error_description"))
                    .and_then(Value::as_str);
                Some(match description {
                    Some(desc) => format!("{code}: {desc}"),
                    None => code.clone(),
                })
            }
            _ => None,
        }
        .unwrap_or_else(|| format!("Request failed with status code {status}"));

        Self::new(RemoteErrorKind::from_status(status, reason), message)
    }
}

/// Main error enum for the MCP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed tool arguments (JSON-RPC -32602).
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Unknown tool or method (JSON-RPC -32601).
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Remote service failure, message passed through verbatim.
    #[error("remote operation failed: {0}")]
    RemoteOperationFailed(#[from] RemoteError),

    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParams(_) => ErrorKind::InvalidParams,
            Error::MethodNotFound(_) => ErrorKind::MethodNotFound,
            Error::RemoteOperationFailed(_) => ErrorKind::RemoteOperationFailed,
            Error::Config(_) | Error::Internal(_) | Error::Serialization(_) | Error::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message without the variant prefix, as shown to the calling agent.
    pub fn message(&self) -> String {
        match self {
            Error::InvalidParams(msg)
            | Error::MethodNotFound(msg)
            | Error::Config(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::RemoteOperationFailed(remote) => remote.message.clone(),
            Error::Serialization(e) => e.to_string(),
            Error::Io(e) => e.to_string(),
        }
    }

    /// Convert to a JSON-RPC error code.
    pub fn json_rpc_code(&self) -> i64 {
        match self.kind() {
            ErrorKind::InvalidParams => crate::mcp::protocol::INVALID_PARAMS,
            ErrorKind::MethodNotFound => crate::mcp::protocol::METHOD_NOT_FOUND,
            ErrorKind::RemoteOperationFailed | ErrorKind::Internal => {
                crate::mcp::protocol::INTERNAL_ERROR
            }
        }
    }
}

// Convenience constructors
impl Error {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    pub fn method_not_found(msg: impl Into<String>) -> Self {
        Self::MethodNotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
