/*
[INPUT]:  Login response payloads
[OUTPUT]: Token pair and the issued-at/expiry view of it
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Tokens returned by `POST /auth/login`; extra fields are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Integer, integral float or numeric string; anything else reads as absent
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_in: Option<u64>,
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let seconds = parse_seconds(&value);
    if seconds.is_none() {
        warn!(expires_in = %value, "ignoring unreadable expiresIn");
    }
    Ok(seconds)
}

fn parse_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64().or_else(|| number.as_f64().and_then(whole_seconds)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_seconds))
        }
        _ => None,
    }
}

fn whole_seconds(secs: f64) -> Option<u64> {
    (secs.is_finite() && secs >= 0.0 && secs.fract() == 0.0 && secs < u64::MAX as f64)
        .then_some(secs as u64)
}

/// Token pair stamped with the instant it was received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedTokens {
    pub fn new(tokens: TokenPair, issued_at: DateTime<Utc>) -> Self {
        let expires_at = tokens
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl));
        Self {
            tokens,
            issued_at,
            expires_at,
        }
    }
}
