/*
[INPUT]:  Identity settings and a produced signature
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical parameters of the challenge operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParams {
    pub address: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
}

impl ChallengeParams {
    pub fn as_pairs(&self) -> [(&'static str, &str); 2] {
        [("address", &self.address), ("clientId", &self.client_id)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginDetails {
    pub signature: String,
    #[serde(flatten)]
    pub echoed: Map<String, Value>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub method: String,
    pub address: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub details: LoginDetails,
}

impl LoginRequest {
    pub const METHOD: &'static str = "eip712";

    pub fn eip712(
        address: impl Into<String>,
        client_id: impl Into<String>,
        signature: impl Into<String>,
        echoed: Map<String, Value>,
    ) -> Self {
        Self {
            method: Self::METHOD.to_string(),
            address: address.into(),
            client_id: client_id.into(),
            details: LoginDetails {
                signature: signature.into(),
                echoed,
            },
        }
    }
}
