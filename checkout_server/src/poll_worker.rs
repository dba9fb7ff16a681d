use std::{sync::Arc, time::Duration};

use checkout_engine::{
    reconciliation_objects::{PollJob, PollOutcome},
    traits::{CheckoutDatabase, PaymentGateway},
    ReconciliationApi,
    SqliteDatabase,
};
use log::*;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{config::PollConfig, integrations::gateway::GatewayClient};

/// Starts the poll worker. Every job that arrives on `jobs` is run in its own task, so a transaction waiting out its
/// re-poll delay never holds up the others. Do not await the returned JoinHandle; it only finishes once every sender
/// for `jobs` has been dropped.
pub fn start_poll_worker(
    api: ReconciliationApi<SqliteDatabase, GatewayClient>,
    config: PollConfig,
    mut jobs: mpsc::Receiver<PollJob>,
) -> JoinHandle<()> {
    let api = Arc::new(api);
    tokio::spawn(async move {
        info!("🔁️ Payment status poll worker started");
        while let Some(job) = jobs.recv().await {
            debug!("🔁️ Status poll scheduled for transaction #{}", job.transaction_id);
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                run_poll_job(&api, &config, job).await;
            });
        }
        info!("🔁️ Payment status poll worker has shut down");
    })
}

/// Drives one transaction through its poll budget: wait, ask the gateway, and repeat for as long as the transaction
/// is still pending and attempts remain. Returns the last outcome, or `None` if the job was abandoned after repeated
/// transient failures.
pub async fn run_poll_job<B, G>(api: &ReconciliationApi<B, G>, config: &PollConfig, job: PollJob) -> Option<PollOutcome>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    let mut job = job;
    loop {
        let delay = if job.attempt == 0 { config.initial_delay } else { config.requeue_delay };
        tokio::time::sleep(delay).await;
        match poll_with_retries(api, config, job).await? {
            PollOutcome::Requeue(next) => {
                let id = next.transaction_id;
                trace!("🔁️ Transaction #{id} is still pending. Polling again in {:?}", config.requeue_delay);
                job = next;
            },
            outcome => return Some(outcome),
        }
    }
}

async fn poll_with_retries<B, G>(api: &ReconciliationApi<B, G>, config: &PollConfig, job: PollJob) -> Option<PollOutcome>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    let id = job.transaction_id;
    let mut retry = 0;
    loop {
        match api.poll_transaction(job).await {
            Ok(outcome) => return Some(outcome),
            Err(e) if e.is_retryable() && retry < config.error_retries => {
                let backoff = backoff_delay(config.error_backoff, retry);
                retry += 1;
                warn!("🔁️ Status poll for #{id} failed ({e}). Retry {retry}/{} in {backoff:?}", config.error_retries);
                tokio::time::sleep(backoff).await;
            },
            Err(e) => {
                error!(
                    "🔁️ Giving up on status polls for transaction #{id}. {e}. The webhook or the expiry sweep will \
                     resolve it."
                );
                return None;
            },
        }
    }
}

fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
}
