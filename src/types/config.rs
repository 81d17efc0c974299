//! Configuration structures.
//!
//! Configuration starts from defaults and is overlaid with environment
//! variables; the binary applies CLI flags on top.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::{Error, Result};

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// MCP server identity.
    #[serde(default)]
    pub server: ServerConfig,

    /// Defaults applied to tool arguments.
    #[serde(default)]
    pub tools: ToolDefaults,

    /// Google API endpoints and credentials.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("GOOGLE_CLIENT_ID") {
            self.google.client_id = Some(v);
        }
        if let Some(v) = get("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = Some(v);
        }
        if let Some(v) = get("GOOGLE_REFRESH_TOKEN") {
            self.google.refresh_token = Some(v);
        }
        if let Some(v) = get("GOOGLE_ACCESS_TOKEN") {
            self.google.access_token = Some(v);
        }
        if let Some(v) = get("DEFAULT_TIME_ZONE") {
            self.tools.default_time_zone = v;
        }
        if let Some(v) = get("TASKCAL_LOG_LEVEL") {
            self.observability.log_level = v;
        }
        if let Some(v) = get("TASKCAL_LOG_FORMAT") {
            self.observability.json_logs = v.eq_ignore_ascii_case("json");
        }
    }

    /// Check that the server can start with this configuration.
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.tools.default_time_zone, "default_time_zone")?;
        validate_non_empty(&self.tools.default_calendar_id, "default_calendar_id")?;
        validate_positive(self.tools.default_max_results, "default_max_results")?;
        self.google.credential_source()?;
        Ok(())
    }
}

/// MCP server identity reported during `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "google-tasks-calendar".to_string(),
            version: "0.2.0".to_string(),
            protocol_version: "2024-11-05".to_string(),
        }
    }
}

/// Defaults substituted for absent tool arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefaults {
    /// Time zone stamped on event start/end when `timeZone` is absent.
    pub default_time_zone: String,

    /// Calendar targeted when `calendarId` is absent.
    pub default_calendar_id: String,

    /// Event listing cap when `maxResults` is absent.
    pub default_max_results: u32,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            default_time_zone: "Asia/Kuala_Lumpur".to_string(),
            default_calendar_id: "primary".to_string(),
            default_max_results: 10,
        }
    }
}

/// Google API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,

    /// Pre-provisioned access token; when set no refresh is performed.
    pub access_token: Option<String>,

    pub token_url: String,
    pub tasks_base_url: String,
    pub calendar_base_url: String,

    /// Per-request timeout for Google API calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            tasks_base_url: "https://tasks.googleapis.com/tasks/v1/".to_string(),
            calendar_base_url: "https://www.googleapis.com/calendar/v3/".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("access_token", &redact(&self.access_token))
            .field("token_url", &self.token_url)
            .field("tasks_base_url", &self.tasks_base_url)
            .field("calendar_base_url", &self.calendar_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Where the access token comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    AccessToken(String),
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            CredentialSource::RefreshToken { client_id, .. } => f
                .debug_struct("RefreshToken")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

impl GoogleConfig {
    /// Resolve the configured credentials. A static access token wins over
    /// the refresh-token triple.
    pub fn credential_source(&self) -> Result<CredentialSource> {
        if let Some(token) = &self.access_token {
            return Ok(CredentialSource::AccessToken(token.clone()));
        }
        match (&self.client_id, &self.client_secret, &self.refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(CredentialSource::RefreshToken {
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    refresh_token: refresh_token.clone(),
                })
            }
            _ => Err(Error::config(
                "GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, and GOOGLE_REFRESH_TOKEN environment variables are required",
            )),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

fn validate_non_empty(s: &str, field: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::config(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_positive(n: u32, field: &str) -> Result<()> {
    if n == 0 {
        return Err(Error::config(format!("{field} must be positive")));
    }
    Ok(())
}
