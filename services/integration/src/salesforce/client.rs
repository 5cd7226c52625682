use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::token::TokenCache;
use super::SalesforceError;
use turath_config::SalesforceConfig;

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
    #[allow(dead_code)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "totalSize")]
    #[allow(dead_code)]
    total_size: i64,
    records: Vec<QueryRecord>,
}

#[derive(Debug, Deserialize)]
struct QueryRecord {
    #[serde(rename = "Id")]
    id: String,
}

/// Thin typed client for the CRM's sobject endpoints.
///
/// Every call attaches a bearer token from the shared cache. A 401 is
/// retried exactly once after invalidating the cache; any other non-2xx
/// surfaces as `SalesforceError::Api` with the remote body.
#[derive(Clone)]
pub struct SalesforceClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
}

impl SalesforceClient {
    pub fn new(config: &SalesforceConfig, tokens: Arc<TokenCache>) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create a record of the given kind and return its generated id.
    pub async fn create<T: Serialize>(
        &self,
        kind: &str,
        payload: &T,
    ) -> Result<String, SalesforceError> {
        let url = format!("{}/sobjects/{kind}", self.base_url);
        let body = serde_json::to_value(payload)?;

        let response = self.execute(Method::POST, &url, Some(body)).await?;
        let response = Self::ensure_success(response).await?;

        let parsed: CreateResponse = response.json().await?;
        tracing::debug!(kind, remote_id = %parsed.id, "record created");
        Ok(parsed.id)
    }

    /// Patch fields of an existing record.
    pub async fn update<T: Serialize>(
        &self,
        kind: &str,
        remote_id: &str,
        payload: &T,
    ) -> Result<(), SalesforceError> {
        let url = format!("{}/sobjects/{kind}/{remote_id}", self.base_url);
        let body = serde_json::to_value(payload)?;

        let response = self.execute(Method::PATCH, &url, Some(body)).await?;
        Self::ensure_success(response).await?;

        tracing::debug!(kind, remote_id, "record updated");
        Ok(())
    }

    /// Find a single record id by an exact field match, or `None`.
    pub async fn find_one(
        &self,
        kind: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<String>, SalesforceError> {
        let soql = format!(
            "SELECT Id FROM {kind} WHERE {field} = '{}' LIMIT 1",
            escape_soql(value)
        );
        let url = format!("{}/query", self.base_url);

        let token = self.tokens.get_token().await?;
        let response = self
            .http
            .get(&url)
            .query(&[("q", &soql)])
            .bearer_auth(&token)
            .send()
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            self.retry_once(Method::GET, &url, None, Some(&soql)).await?
        } else {
            response
        };

        let response = Self::ensure_success(response).await?;
        let parsed: QueryResponse = response.json().await?;

        Ok(parsed.records.into_iter().next().map(|r| r.id))
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, SalesforceError> {
        let token = self.tokens.get_token().await?;
        let response = self.send_once(&method, url, body.as_ref(), None, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return self.retry_once(method, url, body, None).await;
        }

        Ok(response)
    }

    /// One-shot invalidate-and-retry after a 401; a second 401 is surfaced
    /// as-is by `ensure_success`.
    async fn retry_once(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        query: Option<&str>,
    ) -> Result<Response, SalesforceError> {
        tracing::warn!(url, "401 from CRM, refreshing token and retrying once");
        self.tokens.invalidate().await;
        let token = self.tokens.get_token().await?;
        self.send_once(&method, url, body.as_ref(), query, &token).await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        query: Option<&str>,
        token: &str,
    ) -> Result<Response, SalesforceError> {
        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        Ok(request.send().await?)
    }

    async fn ensure_success(response: Response) -> Result<Response, SalesforceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SalesforceError::Api { status, body })
    }
}

/// Escape a value for interpolation into a single-quoted SOQL literal.
fn escape_soql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
