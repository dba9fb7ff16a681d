//! Signature math for the payment gateway.
use std::time::Duration;

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::data_objects::plain_string;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded SHA-256 over `reference ‖ amount_in_cents ‖ currency ‖ integrity_secret`. The gateway rejects new
/// transactions whose signature does not match.
pub fn integrity_signature(reference: &str, amount_in_cents: i64, currency: &str, integrity_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{reference}{amount_in_cents}{currency}{integrity_secret}").as_bytes());
    hex::encode(hasher.finalize())
}

/// The string the gateway signs on webhook deliveries: `{event}.{data.transaction.id}.{timestamp}`.
///
/// Returns `None` if any of the three fields is missing from the payload.
pub fn event_checksum_message(payload: &Value) -> Option<String> {
    let event = payload.get("event").filter(|v| !v.is_null())?;
    let txn_id = payload.pointer("/data/transaction/id").filter(|v| !v.is_null())?;
    let timestamp = payload.get("timestamp").filter(|v| !v.is_null())?;
    Some(format!("{}.{}.{}", plain_string(event), plain_string(txn_id), plain_string(timestamp)))
}

/// Hex-encoded HMAC-SHA256 of the event checksum message, keyed with the events key.
pub fn event_checksum(payload: &Value, events_key: &str) -> Option<String> {
    let message = event_checksum_message(payload)?;
    let mut mac = HmacSha256::new_from_slice(events_key.as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Checks the checksum header of a webhook delivery in constant time. Malformed payloads and non-hex checksums
/// fail verification.
pub fn verify_event_checksum(payload: &Value, checksum: &str, events_key: &str) -> bool {
    let Some(message) = event_checksum_message(payload) else {
        return false;
    };
    let Ok(expected) = hex::decode(checksum.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(events_key.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Exponential backoff: 100ms, 200ms, 400ms, ... for retry 0, 1, 2, ...
pub fn retry_delay(retry: u32) -> Duration {
    Duration::from_millis(100u64.saturating_mul(1u64 << retry.min(16)))
}
