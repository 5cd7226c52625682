use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::SalesforceError;
use turath_config::SalesforceConfig;

/// Lifetime assumed when the token endpoint does not advertise one.
const DEFAULT_LIFETIME_SECS: i64 = 7200;

/// Time source, injected so expiry logic is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    #[allow(dead_code)]
    instance_url: Option<String>,
    #[allow(dead_code)]
    scope: Option<String>,
    expires_in: Option<i64>,
}

/// Bearer-token cache for the CRM's password-grant token endpoint.
///
/// Tokens are cached for 75% of their advertised lifetime. Concurrent
/// refreshes may race; the last writer wins, which at worst fetches one
/// redundant token.
pub struct TokenCache {
    http: Client,
    config: SalesforceConfig,
    clock: Arc<dyn Clock>,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(config: SalesforceConfig) -> Result<Self, reqwest::Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: SalesforceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(StdDuration::from_secs(5))
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            clock,
            cached: RwLock::new(None),
        })
    }

    /// Return a valid bearer token, fetching a fresh one when the cached
    /// token is absent or expired. Fetch failures propagate; retry is the
    /// caller's (i.e. the message redelivery layer's) concern.
    pub async fn get_token(&self) -> Result<String, SalesforceError> {
        let now = self.clock.now();

        if let Some(token) = self.cached.read().await.as_ref() {
            if now < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let token = self.fetch_token(now).await?;
        let value = token.value.clone();
        *self.cached.write().await = Some(token);

        Ok(value)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    /// Used for the one-shot retry after a 401.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken, SalesforceError> {
        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("username", &self.config.username),
                ("password", &self.config.password),
            ])
            .send()
            .await
            .map_err(|e| SalesforceError::Authentication(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Authentication(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| {
            SalesforceError::Authentication(format!("malformed token response: {e}"))
        })?;

        // Conservative expiry: 75% of the advertised lifetime
        let lifetime = parsed.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
        let expires_at = now + Duration::seconds(lifetime * 3 / 4);

        tracing::debug!(lifetime_secs = lifetime, "token fetched");

        Ok(CachedToken {
            value: parsed.access_token,
            expires_at,
        })
    }
}
