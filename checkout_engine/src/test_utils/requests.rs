//! Sample requests and webhook deliveries for tests.
use crate::checkout_objects::{CheckoutRequest, CustomerDetails, DeliveryDetails};

pub fn checkout_request(product_id: i64, quantity: i64) -> CheckoutRequest {
    CheckoutRequest {
        product_id,
        quantity,
        payment_token: "tok_test_31415".into(),
        acceptance_token: "acc_test_27182".into(),
        accept_personal_auth: None,
        installments: 1,
        customer: CustomerDetails { email: "ana@example.com".into(), full_name: "Ana Gómez".into() },
        delivery: DeliveryDetails { address: "Calle 10 # 5-51".into(), city: "Medellín".into(), phone: "3001234567".into() },
    }
}

/// A signed-looking `transaction.updated` webhook body.
pub fn webhook_body(reference: &str, gateway_id: &str, status: &str) -> String {
    serde_json::json!({
        "event": "transaction.updated",
        "data": {
            "transaction": {
                "id": gateway_id,
                "amount_in_cents": 4_500_000,
                "reference": reference,
                "customer_email": "ana@example.com",
                "currency": "COP",
                "payment_method_type": "CARD",
                "status": status
            }
        },
        "environment": "test",
        "timestamp": 1_717_243_200,
        "sent_at": "2024-06-01T12:00:00.000Z"
    })
    .to_string()
}
