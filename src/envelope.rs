//! Response envelope: the uniform `{content, isError}` shape returned for
//! every tool call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Error;

/// Successful operation output.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured upstream data, serialized with indentation.
    Json(Value),
    /// Plain confirmation text.
    Text(String),
}

/// Outcome of one dispatched operation; exactly one side holds.
#[derive(Debug)]
pub enum OperationResult {
    Success(Payload),
    Failure(Error),
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }
}

/// One content item. Only text is produced by this server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Uniform tool-call result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub content: Vec<Content>,
    #[serde(default)]
    pub is_error: bool,
}

impl ResponseEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(message: impl AsRef<str>) -> Self {
        Self {
            content: vec![Content::Text {
                text: format!("Error: {}", message.as_ref()),
            }],
            is_error: true,
        }
    }

    /// Wrap an operation result. `is_error` is set iff the result failed.
    pub fn build(result: OperationResult) -> Self {
        match result {
            OperationResult::Success(Payload::Text(text)) => Self::success(text),
            OperationResult::Success(Payload::Json(value)) => {
                match serde_json::to_string_pretty(&value) {
                    Ok(text) => Self::success(text),
                    Err(e) => Self::error(e.to_string()),
                }
            }
            OperationResult::Failure(err) => Self::error(err.message()),
        }
    }

    /// Text of the first content item.
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(Content::Text { text }) => text,
            None => "",
        }
    }
}
