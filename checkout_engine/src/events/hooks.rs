use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{EventHandler, EventProducer, Handler, PollRequestedEvent, TransactionUpdatedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub transaction_updated_producer: Vec<EventProducer<TransactionUpdatedEvent>>,
    pub poll_requested_producer: Vec<EventProducer<PollRequestedEvent>>,
}

pub struct EventHandlers {
    pub on_transaction_updated: Option<EventHandler<TransactionUpdatedEvent>>,
    pub on_poll_requested: Option<EventHandler<PollRequestedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_transaction_updated = hooks.on_transaction_updated.map(|f| EventHandler::new(buffer_size, f));
        let on_poll_requested = hooks.on_poll_requested.map(|f| EventHandler::new(buffer_size, f));
        Self { on_transaction_updated, on_poll_requested }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_transaction_updated {
            result.transaction_updated_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_poll_requested {
            result.poll_requested_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_transaction_updated {
            debug!("📬️ Starting transaction update handler");
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_poll_requested {
            debug!("📬️ Starting poll request handler");
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_transaction_updated: Option<Handler<TransactionUpdatedEvent>>,
    pub on_poll_requested: Option<Handler<PollRequestedEvent>>,
}

impl EventHooks {
    pub fn on_transaction_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TransactionUpdatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_transaction_updated = Some(Arc::new(f));
        self
    }

    pub fn on_poll_requested<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PollRequestedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_poll_requested = Some(Arc::new(f));
        self
    }
}
