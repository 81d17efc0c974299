//! Google Tasks and Calendar MCP server - stdio entry point.
//!
//! Reads credentials from the environment, then serves MCP on stdin/stdout
//! until stdin closes or ctrl-c arrives.

use clap::Parser;
use std::sync::Arc;

use tasks_calendar_mcp::google::{self, GoogleClient};
use tasks_calendar_mcp::mcp::McpServer;
use tasks_calendar_mcp::tools::ToolRuntime;
use tasks_calendar_mcp::Config;

#[derive(Debug, Parser)]
#[command(name = "tasks-calendar-mcp", version, about)]
struct Cli {
    /// Time zone stamped on event start/end when the caller gives none.
    #[arg(long, env = "DEFAULT_TIME_ZONE")]
    default_time_zone: Option<String>,

    /// Calendar used when `calendarId` is omitted.
    #[arg(long)]
    default_calendar_id: Option<String>,

    /// Log filter when RUST_LOG is unset.
    #[arg(long, env = "TASKCAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON on stderr.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(zone) = self.default_time_zone {
            config.tools.default_time_zone = zone;
        }
        if let Some(calendar) = self.default_calendar_id {
            config.tools.default_calendar_id = calendar;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());
    // The stdin reader may still be parked in a blocking read that cannot be
    // cancelled, so the runtime is not allowed to wait for it.
    runtime.shutdown_background();
    result
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    Cli::parse().apply(&mut config);

    tasks_calendar_mcp::observability::init_tracing(&config.observability);
    config.validate()?;

    let http = google::client::http_client(&config.google)?;
    let credentials = google::auth::supplier_from_config(&config.google, http.clone())?;
    let client = Arc::new(GoogleClient::new(&config.google, http, credentials)?);

    let runtime = ToolRuntime::new(client.clone(), client, config.tools.clone());
    let server = McpServer::new(runtime, config.server.clone());

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            cancel.cancel();
        }
    });

    tracing::info!(
        default_time_zone = %config.tools.default_time_zone,
        "Google Tasks + Calendar MCP server running on stdio"
    );
    server.serve_stdio().await?;
    tracing::info!("server stopped");

    Ok(())
}
