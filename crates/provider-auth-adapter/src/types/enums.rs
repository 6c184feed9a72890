/*
[INPUT]:  Discovery and auth flow vocabulary
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When new parameter encodings or auth states are added
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// How logical parameters are attached to a probed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamEncoding {
    /// `?address=..&clientId=..`
    Query,
    /// `{"address": .., "clientId": ..}`
    JsonBody,
}

impl fmt::Display for ParamEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamEncoding::Query => f.write_str("query"),
            ParamEncoding::JsonBody => f.write_str("json body"),
        }
    }
}

/// Progress of one authentication run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Idle,
    ChallengeFetched,
    Signed,
    Authenticated,
    Failed,
}

impl AuthState {
    /// Authenticated and Failed end a run
    pub fn is_terminal(self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::Failed)
    }
}
