/*
[INPUT]:  Error sources (config, keys, discovery sweep, login, transport, serde)
[OUTPUT]: Structured error types carrying enough context to diagnose a failed run
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ParamEncoding;

/// One request issued during an endpoint discovery sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub method: String,
    pub url: String,
    pub encoding: ParamEncoding,
    /// `None` when the request never produced a response
    pub status: Option<u16>,
    /// Response body, or the transport error text when `status` is `None`
    pub body: String,
}

impl fmt::Display for ProbeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "{} {} ({}) -> {}: {}",
                self.method, self.url, self.encoding, status, self.body
            ),
            None => write!(
                f,
                "{} {} ({}) -> transport error: {}",
                self.method, self.url, self.encoding, self.body
            ),
        }
    }
}

/// Main error type for the provider adapter
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A required setting is absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The private key could not be parsed
    #[error("Invalid private key: {0}")]
    KeyFormat(String),

    /// The key controls a different address than the configured one
    #[error("Address mismatch: key derives {derived}, configured address is {configured}")]
    IdentityMismatch { configured: String, derived: String },

    /// No candidate of the discovery sweep returned success
    #[error(
        "No endpoint found for {operation} after {} attempts (last status {}): {last_body}{}",
        .attempts.len(),
        .last_status.map_or_else(|| "none".to_string(), |s| s.to_string()),
        format_attempts(.attempts)
    )]
    EndpointNotFound {
        operation: String,
        last_status: Option<u16>,
        last_body: String,
        attempts: Vec<ProbeAttempt>,
    },

    /// The challenge body does not have the typed-data shape
    #[error("Invalid challenge: {0}")]
    Challenge(String),

    /// The provider rejected the signed challenge
    #[error("Login failed (status {status}): {body}")]
    Login { status: u16, body: String },

    /// Signing failed after the key was accepted
    #[error("Signing failed: {0}")]
    Signing(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

fn format_attempts(attempts: &[ProbeAttempt]) -> String {
    attempts
        .iter()
        .map(|attempt| format!("\n  - {attempt}"))
        .collect()
}

impl ProviderError {
    /// Check if the error comes from misconfigured credentials
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            ProviderError::KeyFormat(_) | ProviderError::IdentityMismatch { .. }
        )
    }

    /// Check if the error means a required setting was missing
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ProviderError::Configuration(_))
    }

    /// Create a login error from the provider's status and body
    pub fn login_rejected(status: StatusCode, body: impl Into<String>) -> Self {
        ProviderError::Login {
            status: status.as_u16(),
            body: body.into(),
        }
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
