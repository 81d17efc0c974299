//! Credential suppliers for the Google APIs.
//!
//! Token acquisition is not this server's concern: it either holds a
//! pre-provisioned access token or exchanges a pre-provisioned refresh token
//! at the OAuth token endpoint. Interactive consent flows live elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::google::RemoteResult;
use crate::types::{CredentialSource, GoogleConfig, RemoteError, RemoteErrorKind, Result};

/// Tokens are refreshed this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Upper bound on a reported lifetime; Google access tokens last an hour.
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 3600;

/// Supplies a bearer token for each outbound call.
#[async_trait]
pub trait CredentialSupplier: Send + Sync {
    async fn access_token(&self) -> RemoteResult<String>;
}

/// A fixed, pre-provisioned access token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl CredentialSupplier for StaticToken {
    async fn access_token(&self) -> RemoteResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Expiry for a token issued at `now`. Lifetimes outside
/// `0..=MAX_TOKEN_LIFETIME_SECS` are clamped, and an unrepresentable instant
/// yields `now` so the token is refreshed on next use.
fn expiry_after(now: DateTime<Utc>, lifetime_secs: i64) -> DateTime<Utc> {
    Duration::try_seconds(lifetime_secs.clamp(0, MAX_TOKEN_LIFETIME_SECS))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Exchanges a refresh token for access tokens and caches them until
/// shortly before expiry.
///
/// The cache sits behind an async mutex, so concurrent dispatches that find
/// the token stale wait for a single refresh instead of each issuing one.
pub struct RefreshTokenSupplier {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    cached: Mutex<Option<CachedToken>>,
}

impl RefreshTokenSupplier {
    pub fn new(
        http: reqwest::Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> RemoteResult<CachedToken> {
        tracing::debug!(token_url = %self.token_url, "refreshing access token");

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RemoteError::new(RemoteErrorKind::Unavailable, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mut err = RemoteError::from_http(status.as_u16(), &body);
            // A rejected grant means the stored credentials are no longer usable.
            if status.is_client_error() && err.kind != RemoteErrorKind::RateLimited {
                err.kind = RemoteErrorKind::AuthExpired;
            }
            tracing::warn!(status = status.as_u16(), "token refresh rejected: {}", err.message);
            return Err(err);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::new(RemoteErrorKind::Other, e.to_string()))?;
        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        Ok(CachedToken {
            token: token.access_token,
            expires_at: expiry_after(Utc::now(), lifetime),
        })
    }
}

impl fmt::Debug for RefreshTokenSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenSupplier")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialSupplier for RefreshTokenSupplier {
    async fn access_token(&self) -> RemoteResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if current.is_fresh(Utc::now()) {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// Build the supplier described by the configuration.
pub fn supplier_from_config(
    config: &GoogleConfig,
    http: reqwest::Client,
) -> Result<Arc<dyn CredentialSupplier>> {
    let supplier: Arc<dyn CredentialSupplier> = match config.credential_source()? {
        CredentialSource::AccessToken(token) => Arc::new(StaticToken::new(token)),
        CredentialSource::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        } => Arc::new(RefreshTokenSupplier::new(
            http,
            config.token_url.clone(),
            client_id,
            client_secret,
            refresh_token,
        )),
    };
    Ok(supplier)
}
