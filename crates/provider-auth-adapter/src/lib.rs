/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public provider auth adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod config;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    AuthManager,
    EvmWalletSigner,
    MockTypedDataSigner,
    TypedDataSigner,
};

pub use config::{ApiSettings, AuthSettings, ClientConfig, RawSettings, ResolverConfig};

// Re-export commonly used types from http
pub use http::{
    CandidateTable,
    EndpointCandidate,
    EndpointResolver,
    ProbeAttempt,
    ProviderClient,
    ProviderError,
    RequestOptions,
    Result,
};

// Re-export all types
pub use types::*;
