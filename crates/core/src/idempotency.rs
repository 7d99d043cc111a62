//! Idempotency keys for at-most-once notification delivery.
//!
//! A key covers the event type, an event-specific discriminator, the
//! recipient, and the dispatch time truncated to the minute. Two dispatches
//! of the same logical event to the same user within one minute collapse to
//! one key; the `user_notifications.idempotency_key` unique constraint turns
//! the second insert into a no-op.
//!
//! A retry that crosses a minute boundary produces a new key and therefore a
//! second notification. That imprecision is accepted.

use chrono::{DurationRound, TimeDelta};
use serde_json::Value;

use crate::hashing::sha256_hex;
use crate::template::{lookup_path, render_value};
use crate::types::{DbId, EventData, Timestamp};

/// How to extract the discriminating identifier for an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminator {
    /// First non-empty value among the candidate paths.
    FirstOf(&'static [&'static str]),
    /// Two fields joined, for pairwise events such as completions.
    Composite(&'static str, &'static str),
    /// Hash of the whole payload.
    Payload,
}

impl Discriminator {
    /// Extract the discriminator. Falls back to a payload hash when the
    /// configured fields are absent.
    pub fn extract(&self, data: &EventData) -> String {
        let field = |path: &str| {
            lookup_path(data, path)
                .and_then(render_value)
                .filter(|v| !v.is_empty())
        };

        let found = match self {
            Discriminator::FirstOf(paths) => paths.iter().find_map(|p| field(*p)),
            Discriminator::Composite(a, b) => match (field(*a), field(*b)) {
                (Some(a), Some(b)) => Some(format!("{a}:{b}")),
                _ => None,
            },
            Discriminator::Payload => None,
        };

        found.unwrap_or_else(|| payload_hash(data))
    }
}

/// Hash of the payload with object keys sorted at every level, so field order
/// never changes the result.
pub fn payload_hash(data: &EventData) -> String {
    let mut buf = String::new();
    write_canonical(&Value::Object(data.clone()), &mut buf);
    sha256_hex(buf.as_bytes())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Truncate a timestamp to the start of its minute.
pub fn minute_bucket(at: Timestamp) -> Timestamp {
    at.duration_trunc(TimeDelta::minutes(1)).unwrap_or(at)
}

/// Derive the idempotency key for one (event, recipient) pair.
pub fn idempotency_key(
    event_type: &str,
    discriminator: &str,
    user_id: DbId,
    at: Timestamp,
) -> String {
    let minute = minute_bucket(at).format("%Y-%m-%dT%H:%M");
    let material = format!("{event_type}|{discriminator}|{user_id}|{minute}");
    sha256_hex(material.as_bytes())
}
