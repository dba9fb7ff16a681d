use std::time::Duration;

use ckt_common::Secret;
use log::*;

pub const DEFAULT_GATEWAY_API_URL: &str = "https://api-sandbox.co.uat.wompi.dev/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API, without a trailing slash.
    pub api_url: String,
    /// Merchant private key, sent as a bearer token.
    pub private_key: Secret<String>,
    /// Secret appended to the integrity signature of new transactions.
    pub integrity_secret: Secret<String>,
    /// Key used by the gateway to sign webhook events.
    pub events_key: Secret<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GATEWAY_API_URL.to_string(),
            private_key: Secret::default(),
            integrity_secret: Secret::default(),
            events_key: Secret::default(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CKT_GATEWAY_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("CKT_GATEWAY_API_URL not set, using the sandbox API at {DEFAULT_GATEWAY_API_URL}");
                DEFAULT_GATEWAY_API_URL.to_string()
            });
        let private_key = secret_from_env("CKT_GATEWAY_PRIVATE_KEY");
        let integrity_secret = secret_from_env("CKT_GATEWAY_INTEGRITY_SECRET");
        let events_key = secret_from_env("CKT_GATEWAY_EVENTS_KEY");
        let timeout = std::env::var("CKT_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for CKT_GATEWAY_TIMEOUT_SECS. {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let max_retries = std::env::var("CKT_GATEWAY_MAX_RETRIES")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("Invalid value for CKT_GATEWAY_MAX_RETRIES. {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_RETRIES);
        Self { api_url, private_key, integrity_secret, events_key, timeout, max_retries }
    }
}

fn secret_from_env(name: &str) -> Secret<String> {
    let value = std::env::var(name).map(|s| s.trim().to_string()).unwrap_or_else(|_| {
        warn!("{name} not set, using an empty (and probably useless) default");
        String::default()
    });
    Secret::new(value)
}
