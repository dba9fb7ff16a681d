use checkout_engine::{
    events::{EventHandlers, EventHooks, TransactionUpdatedEvent},
    reconciliation_objects::PollJob,
};
use log::*;
use tokio::sync::mpsc;

pub const EVENT_BUFFER_SIZE: usize = 25;

/// Assigns the server's event handlers.
///
/// 1. TransactionUpdatedEvent - the transaction's new status is logged. This is the notification sink for anything
///    that needs to follow purchases (e-mails, fulfilment).
/// 2. PollRequestedEvent - the job is handed to the poll worker through `poll_jobs`. The worker is started separately,
///    since it depends on the APIs that these handlers feed.
pub fn create_event_handlers(poll_jobs: mpsc::Sender<PollJob>) -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_transaction_updated(move |ev| {
        let TransactionUpdatedEvent { transaction_id, reference, status, timestamp } = ev;
        Box::pin(async move {
            info!("📬️ Transaction {reference} (#{transaction_id}) is {status} as of {timestamp}");
        })
    });
    hooks.on_poll_requested(move |ev| {
        let poll_jobs = poll_jobs.clone();
        Box::pin(async move {
            let id = ev.job.transaction_id;
            if let Err(e) = poll_jobs.send(ev.job).await {
                error!("📬️ Could not schedule a status poll for transaction #{id}. The poll worker is gone. {e}");
            }
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}
