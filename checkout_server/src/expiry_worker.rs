use std::time::Duration;

use checkout_engine::{db_types::Transaction, SqliteDatabase, TransactionFlowApi};
use log::*;
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, pending transactions whose reservation hold has run out are voided and their stock released.
pub fn start_expiry_worker(api: TransactionFlowApi<SqliteDatabase>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Reservation expiry worker started. Sweeping every {interval:?}");
        loop {
            timer.tick().await;
            debug!("🕰️ Running reservation expiry job");
            match api.sweep_expired_reservations(api.now()).await {
                Ok(result) if result.total_count() == 0 => trace!("🕰️ No expired reservations"),
                Ok(result) => {
                    info!("🕰️ {} expired reservations voided", result.voided_count());
                    debug!("🕰️ Voided: {}", transaction_list(&result.voided));
                    if !result.already_final.is_empty() {
                        debug!("🕰️ Settled before the sweep reached them: {}", transaction_list(&result.already_final));
                    }
                    for (id, e) in &result.failures {
                        warn!("🕰️ Could not void transaction #{id}. It will be retried on the next sweep. {e}");
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running reservation expiry job: {e}");
                },
            }
        }
    })
}

fn transaction_list(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(|t| format!("[{}] {}x product #{} status: {}", t.reference, t.quantity, t.product_id, t.status))
        .collect::<Vec<String>>()
        .join(", ")
}
