use std::fmt::Debug;

use log::*;

use crate::{
    ckt_api::{
        checkout_objects::{CheckoutConfig, CheckoutRequest, CheckoutResult},
        errors::CheckoutError,
        gateway_objects::NewGatewayTransaction,
        reconciliation_objects::PollJob,
        transaction_flow_api::TransactionFlowApi,
    },
    db_types::{NewTransaction, TransactionStatus},
    traits::{CheckoutDatabase, PaymentGateway},
};

/// `CheckoutApi` turns a buyer's request into a stock reservation, a pending transaction and a payment started at the
/// gateway.
pub struct CheckoutApi<B, G> {
    flow: TransactionFlowApi<B>,
    gateway: G,
    config: CheckoutConfig,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({:?})", self.config)
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(flow: TransactionFlowApi<B>, gateway: G, config: CheckoutConfig) -> Self {
        Self { flow, gateway, config }
    }

    pub fn flow(&self) -> &TransactionFlowApi<B> {
        &self.flow
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    /// Reserves stock for the request and starts the payment.
    ///
    /// The reservation is taken before anything is written, so a buyer who cannot be served never reaches the
    /// gateway. If anything fails after the reservation, the reservation is given back before the error is returned.
    ///
    /// If the gateway has not settled the payment yet, a status poll is requested and the transaction is returned as
    /// `Pending`.
    pub async fn reserve_and_initiate(&self, request: CheckoutRequest) -> Result<CheckoutResult, CheckoutError> {
        request.validate().map_err(CheckoutError::Validation)?;
        let db = self.flow.db();
        let CheckoutRequest { product_id, quantity, .. } = request;
        let product = db.fetch_product(product_id).await?.ok_or(CheckoutError::ProductNotFound(product_id))?;
        if !db.reserve_stock(product_id, quantity).await? {
            info!("🔄️🛒️ Only {} units of product #{product_id} available. {quantity} requested.", product.available());
            return Err(CheckoutError::InsufficientStock { product_id, requested: quantity });
        }
        let now = self.flow.now();
        let total = self.config.total_for(product.price, quantity);
        let customer_email = request.customer.email.trim().to_string();
        let new_txn = NewTransaction {
            product_id,
            quantity,
            unit_price: product.price,
            base_fee: self.config.base_fee,
            delivery_fee: self.config.delivery_fee,
            total,
            customer: request.customer.into(),
            delivery: request.delivery.into(),
            reserved_until: now + self.config.hold_duration,
            created_at: now,
        };
        let txn = match db.insert_pending_transaction(new_txn).await {
            Ok(txn) => txn,
            Err(e) => {
                error!("🔄️🛒️ Could not save the checkout for product #{product_id}: {e}. Releasing the reservation.");
                if let Err(release_err) = db.release_stock(product_id, quantity).await {
                    error!("🔄️🛒️ Could not release {quantity} units of product #{product_id}: {release_err}");
                }
                return Err(e.into());
            },
        };
        debug!("🔄️🛒️ Transaction {txn} created. Starting payment.");
        let payment = NewGatewayTransaction {
            acceptance_token: request.acceptance_token,
            accept_personal_auth: request.accept_personal_auth,
            amount_in_cents: total,
            reference: txn.reference.clone(),
            payment_token: request.payment_token,
            installments: request.installments,
            customer_email,
        };
        let gateway_txn = match self.gateway.create_transaction(payment).await {
            Ok(g) => g,
            Err(e) => {
                warn!("🔄️🛒️ The gateway did not accept payment for {}: {e}. Voiding the transaction.", txn.reference);
                if let Err(void_err) = self.flow.finalize(txn.id, TransactionStatus::Voided, None).await {
                    error!("🔄️🛒️ Could not void {}: {void_err}. The sweeper will release it.", txn.reference);
                }
                return Err(e.into());
            },
        };
        let txn = db.record_gateway_txn_id(txn.id, &gateway_txn.id, self.flow.now()).await?;
        let status = TransactionStatus::from(gateway_txn.status.clone());
        let txn = if status.is_final() {
            self.flow.finalize(txn.id, status, Some(gateway_txn.id)).await?.transaction
        } else {
            self.flow.request_poll(PollJob::first(txn.id));
            txn
        };
        info!("🔄️🛒️ Checkout for {} complete. Status: {}", txn.reference, txn.status);
        Ok(CheckoutResult { transaction_id: txn.id, reference: txn.reference, status: txn.status, total: txn.total })
    }
}
