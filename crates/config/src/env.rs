use turath_common::error::{TurathError, TurathResult};
use serde::Deserialize;
use std::env;

/// Connection settings for the Salesforce-style CRM.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesforceConfig {
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationConfig {
    pub database_url: String,
    pub kafka_bootstrap_servers: String,
    pub external_kafka_bootstrap_servers: String,
    pub external_claim_topic: String,
    pub salesforce: SalesforceConfig,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl IntegrationConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> TurathResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            kafka_bootstrap_servers: get_var("KAFKA_BOOTSTRAP_SERVERS")?,
            external_kafka_bootstrap_servers: get_var("EXTERNAL_KAFKA_BOOTSTRAP_SERVERS")?,
            external_claim_topic: get_var_or("EXTERNAL_CLAIM_TOPIC", "claims.status-updates"),
            salesforce: SalesforceConfig {
                auth_url: get_var("SF_AUTH_URL")?,
                client_id: get_var("SF_CLIENT_ID")?,
                client_secret: get_var("SF_CLIENT_SECRET")?,
                username: get_var("SF_USERNAME")?,
                password: get_var("SF_PASSWORD")?,
                base_url: get_var("SF_BASE_URL")?,
                timeout_secs: get_var_or("SF_TIMEOUT_SECS", "10")
                    .parse()
                    .map_err(|e| TurathError::Config(format!("invalid SF_TIMEOUT_SECS: {e}")))?,
            },
            host: get_var_or("HOST", "0.0.0.0"),
            port: get_var_or("PORT", "8080")
                .parse()
                .map_err(|e| TurathError::Config(format!("invalid PORT: {e}")))?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var(key: &str) -> TurathResult<String> {
    env::var(key).map_err(|_| TurathError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
