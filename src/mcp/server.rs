//! MCP stdio server: read loop with per-request tasks and a single writer.

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::mcp::codec::{read_message, write_message, DEFAULT_MAX_MESSAGE_BYTES};
use crate::mcp::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR,
};
use crate::mcp::router::route_request;
use crate::tools::ToolRuntime;
use crate::types::ServerConfig;

/// Responses waiting for the writer.
const OUTBOUND_QUEUE: usize = 64;

/// MCP server wrapping the tool runtime.
#[derive(Debug)]
pub struct McpServer {
    runtime: Arc<ToolRuntime>,
    server: Arc<ServerConfig>,
    cancel: CancellationToken,
    max_message_bytes: usize,
}

impl McpServer {
    pub fn new(runtime: ToolRuntime, server: ServerConfig) -> Self {
        Self {
            runtime: Arc::new(runtime),
            server: Arc::new(server),
            cancel: CancellationToken::new(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    /// Serve over the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run until the reader hits EOF or the server is cancelled.
    ///
    /// Each request runs in its own task; responses may therefore be written
    /// out of order and are matched by `id`. On EOF in-flight requests are
    /// allowed to finish; on cancellation they are aborted.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!(
            name = %self.server.name,
            version = %self.server.version,
            "MCP server listening on stdio"
        );

        let mut reader = BufReader::new(reader);
        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(OUTBOUND_QUEUE);
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut in_flight = JoinSet::new();

        let read_result = loop {
            // read_message is not cancel-safe, so finished tasks are reaped
            // here rather than in a select arm.
            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("MCP server shutting down");
                    in_flight.shutdown().await;
                    break Ok(());
                }
                line = read_message(&mut reader, self.max_message_bytes) => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            tracing::debug!("stdin closed");
                            break Ok(());
                        }
                        Err(e) => break Err(e),
                    };

                    match parse_request(&line) {
                        Ok(request) => {
                            let runtime = Arc::clone(&self.runtime);
                            let server = Arc::clone(&self.server);
                            let tx = tx.clone();
                            in_flight.spawn(async move {
                                if let Some(response) = route_request(&runtime, &server, request).await {
                                    // Receiver only closes once the writer has failed.
                                    let _ = tx.send(response).await;
                                }
                            });
                        }
                        Err(response) => {
                            if tx.send(response).await.is_err() {
                                break Ok(());
                            }
                        }
                    }
                }
            }
        };

        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        drop(tx);

        let write_result = match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        };
        read_result.and(write_result)
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this server when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if !e.is_cancelled() {
            tracing::error!("request task failed: {}", e);
        }
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<JsonRpcResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        write_message(&mut writer, &response).await?;
    }
    Ok(())
}

/// Decode one line; protocol-level failures come back as ready responses.
fn parse_request(line: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!("unparseable message: {}", e);
        JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::failure(
            id,
            JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
        )
    })
}
