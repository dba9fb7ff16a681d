use checkout_engine::{
    clock::Clock,
    db_types::TransactionStatus,
    gateway_objects::GatewayStatus,
    reconciliation_objects::{PollJob, PollOutcome},
    test_utils::{fake_gateway::VALID_SIGNATURE, FakeGateway},
    traits::InventoryManagement,
};
use chrono::Duration;
use cucumber::{then, when};

use crate::cucumber::{checkout_world::request_for, CheckoutWorld};

#[when(expr = "{word} checks out {int} units of {string}")]
async fn check_out(world: &mut CheckoutWorld, buyer: String, quantity: i64, product: String) {
    let product_id = world.product_id(&product);
    let request = request_for(&buyer, product_id, quantity);
    match world.system().checkout.reserve_and_initiate(request).await {
        Ok(result) => {
            world.transactions.insert(buyer, result.transaction_id);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "the gateway reports {word}'s payment as {word}")]
async fn webhook_arrives(world: &mut CheckoutWorld, buyer: String, status: String) {
    let id = world.transaction_id(&buyer);
    let txn = world.system().flow.fetch_transaction(id).await.unwrap().expect("Transaction does not exist");
    let body = serde_json::json!({
        "event": "transaction.updated",
        "data": { "transaction": { "id": FakeGateway::gateway_id_for(&txn.reference), "reference": txn.reference, "status": status } },
        "timestamp": 1_717_243_200
    })
    .to_string();
    world.system().reconciliation.handle_webhook(&body, Some(VALID_SIGNATURE)).await.expect("Webhook failed");
}

#[when(expr = "the gateway keeps answering {word}")]
async fn script_gateway(world: &mut CheckoutWorld, status: String) {
    world.system().gateway.script_fetches([Ok(GatewayStatus::from(status))]);
}

#[when(expr = "{word}'s payment is polled until the budget runs out")]
async fn poll_until_exhausted(world: &mut CheckoutWorld, buyer: String) {
    let mut job = PollJob::first(world.transaction_id(&buyer));
    loop {
        match world.system().reconciliation.poll_transaction(job).await.expect("Poll failed") {
            PollOutcome::Requeue(next) => job = next,
            PollOutcome::Exhausted => break,
            other => panic!("Unexpected poll outcome: {other:?}"),
        }
    }
}

#[when(expr = "{int} minutes pass")]
async fn time_passes(world: &mut CheckoutWorld, minutes: i64) {
    world.system().clock.advance(Duration::minutes(minutes));
}

#[when("the expiry sweeper runs")]
async fn sweep(world: &mut CheckoutWorld) {
    let now = world.system().clock.now();
    let result = world.system().reconciliation.sweep_expired_reservations(now).await.expect("Sweep failed");
    assert_eq!(result.failure_count(), 0);
}

#[then(expr = "{string} has {int} units in stock and {int} reserved")]
async fn check_stock(world: &mut CheckoutWorld, product: String, stock: i64, reserved: i64) {
    let id = world.product_id(&product);
    let p = world.system().flow.db().fetch_product(id).await.unwrap().expect("Product does not exist");
    assert_eq!((p.stock_quantity, p.reserved_quantity), (stock, reserved), "stock/reserved of {product}");
}

#[then(expr = "{word}'s transaction is {word}")]
async fn check_status(world: &mut CheckoutWorld, buyer: String, status: String) {
    let id = world.transaction_id(&buyer);
    let txn = world.system().flow.fetch_transaction(id).await.unwrap().expect("Transaction does not exist");
    let expected: TransactionStatus = status.parse().expect("Not a transaction status");
    assert_eq!(txn.status, expected);
}

#[then("the checkout is refused for insufficient stock")]
async fn check_refused(world: &mut CheckoutWorld) {
    let err = world.last_error.as_ref().expect("The checkout succeeded");
    assert!(err.to_string().contains("Not enough stock"), "Unexpected error: {err}");
}

#[then(expr = "the gateway was polled {int} times")]
async fn check_polls(world: &mut CheckoutWorld, n: usize) {
    assert_eq!(world.system().gateway.fetch_calls(), n);
}
