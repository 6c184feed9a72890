/*
[INPUT]:  HTTP client configuration and provider endpoints
[OUTPUT]: HTTP responses, discovered endpoints and typed errors
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod discovery;
pub mod error;

pub use error::{ProbeAttempt, ProviderError, Result};

pub use client::{ProviderClient, RequestOptions, build_http_client, join_url};
pub use discovery::{CandidateTable, EndpointCandidate, EndpointResolver, ResolvedEndpoint};
