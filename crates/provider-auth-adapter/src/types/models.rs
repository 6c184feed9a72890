/*
[INPUT]:  Provider challenge payloads
[OUTPUT]: Typed-data challenge model with shape validation
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the challenge schema changes
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::{ProviderError, Result};

/// EIP-712 domain as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDomain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Number or hex string, passed through as received
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

/// One `{name, type}` member of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Typed-data challenge issued by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataChallenge {
    pub domain: ChallengeDomain,
    pub types: BTreeMap<String, Vec<TypeField>>,
    pub message: Map<String, Value>,
    pub primary_type: String,
}

impl TypedDataChallenge {
    /// Parse a challenge body and check that `primaryType` names a declared type.
    pub fn from_json(body: &str) -> Result<Self> {
        let challenge: Self = serde_json::from_str(body)
            .map_err(|e| ProviderError::Challenge(format!("unexpected challenge shape: {e}")))?;
        challenge.validate()?;
        Ok(challenge)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.types.contains_key(&self.primary_type) {
            return Err(ProviderError::Challenge(format!(
                "primaryType '{}' is not declared in types",
                self.primary_type
            )));
        }
        Ok(())
    }

    /// Top-level scalar message fields, echoed back in the login details.
    ///
    /// Strings, numbers and booleans are copied verbatim; objects, arrays and
    /// nulls are left out, as is any field named `signature`.
    pub fn echoed_fields(&self) -> Map<String, Value> {
        self.message
            .iter()
            .filter(|(key, _)| key.as_str() != "signature")
            .filter(|(_, value)| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
