use std::{env, str::FromStr, time::Duration};

use checkout_engine::{checkout_objects::CheckoutConfig, reconciliation_objects::ReconciliationConfig};
use ckt_common::{parse_boolean_flag, Cents};
use gateway_tools::GatewayConfig;
use log::*;

const DEFAULT_CKT_HOST: &str = "127.0.0.1";
const DEFAULT_CKT_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/checkout_store.db";
const DEFAULT_RESERVATION_HOLD_MINS: i64 = 15;
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_POLL_INITIAL_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_POLL_REQUEUE_DELAY: Duration = Duration::from_secs(600);
const DEFAULT_POLL_MAX_REQUEUES: u32 = 5;
const DEFAULT_POLL_ERROR_RETRIES: u32 = 3;
const DEFAULT_POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Fees and the reservation hold applied to every checkout.
    pub checkout: CheckoutConfig,
    /// How often the expiry sweeper looks for abandoned reservations.
    pub sweep_interval: Duration,
    pub poll: PollConfig,
    /// When false, webhook deliveries are processed without checking their signature. **DANGER**. Only ever disable
    /// this for local testing.
    pub webhook_signature_checks: bool,
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CKT_HOST.to_string(),
            port: DEFAULT_CKT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            checkout: CheckoutConfig::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            poll: PollConfig::default(),
            webhook_signature_checks: true,
            gateway: GatewayConfig::default(),
        }
    }
}

/// Scheduling of the delayed gateway status checks that follow a checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first poll.
    pub initial_delay: Duration,
    /// Delay before each re-poll of a transaction that is still pending.
    pub requeue_delay: Duration,
    /// Re-polls allowed after the first poll.
    pub max_requeues: u32,
    /// How many times a poll that failed with a transient error is repeated before the job is dropped.
    pub error_retries: u32,
    /// Delay before the first repeat of a failed poll. Doubles on every further repeat.
    pub error_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_POLL_INITIAL_DELAY,
            requeue_delay: DEFAULT_POLL_REQUEUE_DELAY,
            max_requeues: DEFAULT_POLL_MAX_REQUEUES,
            error_retries: DEFAULT_POLL_ERROR_RETRIES,
            error_backoff: DEFAULT_POLL_ERROR_BACKOFF,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CKT_HOST").ok().unwrap_or_else(|| DEFAULT_CKT_HOST.into());
        let port = parse_env("CKT_PORT", DEFAULT_CKT_PORT);
        let database_url = env::var("CKT_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CKT_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let checkout = CheckoutConfig {
            base_fee: Cents::from(parse_env::<i64>("CKT_BASE_FEE_CENTS", 0)),
            delivery_fee: Cents::from(parse_env::<i64>("CKT_DELIVERY_FEE_CENTS", 0)),
            hold_duration: chrono::Duration::minutes(parse_env(
                "CKT_RESERVATION_HOLD_MINS",
                DEFAULT_RESERVATION_HOLD_MINS,
            )),
        };
        let sweep_interval = parse_duration_secs("CKT_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL);
        let poll = PollConfig::from_env_or_default();
        let webhook_signature_checks = parse_boolean_flag(env::var("CKT_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !webhook_signature_checks {
            warn!(
                "🚨️ Webhook signature checks are DISABLED. Anyone can settle payments on this server. Never run like \
                 this in production. 🚨️"
            );
        }
        let gateway = GatewayConfig::new_from_env_or_default();
        Self { host, port, database_url, checkout, sweep_interval, poll, webhook_signature_checks, gateway }
    }

    pub fn reconciliation_config(&self) -> ReconciliationConfig {
        ReconciliationConfig { max_requeues: self.poll.max_requeues, verify_signatures: self.webhook_signature_checks }
    }
}

impl PollConfig {
    pub fn from_env_or_default() -> Self {
        Self {
            initial_delay: parse_duration_secs("CKT_POLL_INITIAL_DELAY_SECS", DEFAULT_POLL_INITIAL_DELAY),
            requeue_delay: parse_duration_secs("CKT_POLL_REQUEUE_DELAY_SECS", DEFAULT_POLL_REQUEUE_DELAY),
            max_requeues: parse_env("CKT_POLL_MAX_REQUEUES", DEFAULT_POLL_MAX_REQUEUES),
            error_retries: DEFAULT_POLL_ERROR_RETRIES,
            error_backoff: DEFAULT_POLL_ERROR_BACKOFF,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            info!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

fn parse_duration_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(parse_env(name, default.as_secs()))
}
