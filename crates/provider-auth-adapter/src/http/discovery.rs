/*
[INPUT]:  Base URL, logical operation path and its parameters
[OUTPUT]: Response of the first candidate request shape the provider accepts
[POS]:    HTTP layer - endpoint discovery against an unstable provider contract
[UPDATE]: When the provider moves routes or a new request shape is observed
*/

use reqwest::{Client, Method, StatusCode};
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::http::client::trim_base;
use crate::http::{ProbeAttempt, ProviderError, Result};
use crate::types::ParamEncoding;

/// Logical path of the typed-data challenge operation
pub const CHALLENGE_PATH: &str = "/auth/eip712-message";

/// Version prefixes tried in order before the logical path
pub const PATH_PREFIXES: &[&str] = &["", "/v1", "/v2", "/api"];

/// Request shapes tried for every prefix, in order
pub const REQUEST_SHAPES: &[(Method, ParamEncoding)] = &[
    (Method::GET, ParamEncoding::Query),
    (Method::POST, ParamEncoding::JsonBody),
];

/// One `(method, path, encoding)` entry of the candidate table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub method: Method,
    pub path: String,
    pub encoding: ParamEncoding,
}

impl EndpointCandidate {
    pub fn new(method: Method, path: impl Into<String>, encoding: ParamEncoding) -> Self {
        Self {
            method,
            path: path.into(),
            encoding,
        }
    }
}

/// Ordered candidates for one logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTable {
    operation: String,
    candidates: Vec<EndpointCandidate>,
}

impl CandidateTable {
    /// Every request shape against every prefix: all GETs first, then all POSTs.
    pub fn for_operation(logical_path: &str) -> Self {
        let logical_path = ensure_leading_slash(logical_path);
        let candidates = REQUEST_SHAPES
            .iter()
            .flat_map(|(method, encoding)| {
                let logical_path = logical_path.clone();
                PATH_PREFIXES.iter().map(move |prefix| {
                    EndpointCandidate::new(method.clone(), format!("{prefix}{logical_path}"), *encoding)
                })
            })
            .collect();

        Self {
            operation: logical_path,
            candidates,
        }
    }

    /// Table for the typed-data challenge
    pub fn challenge() -> Self {
        Self::for_operation(CHALLENGE_PATH)
    }

    /// Explicit table, tried exactly in the given order
    pub fn from_candidates(operation: impl Into<String>, candidates: Vec<EndpointCandidate>) -> Self {
        Self {
            operation: operation.into(),
            candidates,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn candidates(&self) -> &[EndpointCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Successful probe: the candidate that answered and its body
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub candidate: EndpointCandidate,
    pub url: String,
    pub status: StatusCode,
    pub body: String,
    /// Number of requests issued, the successful one included
    pub attempts: usize,
}

/// Sequential candidate sweep against one provider
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    http_client: Client,
    base_url: String,
    config: ResolverConfig,
}

impl EndpointResolver {
    pub fn new(http_client: Client, base_url: &str, config: ResolverConfig) -> Self {
        Self {
            http_client,
            base_url: trim_base(base_url).to_string(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET the bare base URL and report its status; never fails.
    pub async fn check_reachability(&self) -> Option<StatusCode> {
        match self.http_client.get(&self.base_url).send().await {
            Ok(response) => {
                let status = response.status();
                info!(base_url = %self.base_url, status = status.as_u16(), "provider reachability check");
                Some(status)
            }
            Err(err) => {
                warn!(base_url = %self.base_url, error = %err, "provider reachability check failed");
                None
            }
        }
    }

    /// Try each candidate in order and return the first success.
    ///
    /// Non-success statuses and transport errors are recorded and the sweep
    /// moves on; `EndpointNotFound` is returned only once the table is exhausted.
    pub async fn resolve(
        &self,
        table: &CandidateTable,
        params: &[(&str, &str)],
    ) -> Result<ResolvedEndpoint> {
        if self.config.reachability_check {
            self.check_reachability().await;
        }

        let mut attempts: Vec<ProbeAttempt> = Vec::with_capacity(table.len());

        for candidate in table.candidates() {
            let url = format!("{}{}", self.base_url, ensure_leading_slash(&candidate.path));
            debug!(
                method = %candidate.method,
                url = %url,
                encoding = %candidate.encoding,
                "probing endpoint candidate"
            );

            let builder = self
                .http_client
                .request(candidate.method.clone(), &url)
                .header(reqwest::header::ACCEPT, "application/json");
            let builder = match candidate.encoding {
                ParamEncoding::Query => builder.query(params),
                ParamEncoding::JsonBody => builder.json(&params_object(params)),
            };

            let mut attempt = ProbeAttempt {
                method: candidate.method.to_string(),
                url: url.clone(),
                encoding: candidate.encoding,
                status: None,
                body: String::new(),
            };

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => {
                    warn!(url = %url, error = %err, "endpoint candidate unreachable");
                    attempt.body = err.to_string();
                    attempts.push(attempt);
                    continue;
                }
            };

            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));

            if status.is_success() {
                info!(
                    operation = table.operation(),
                    method = %candidate.method,
                    url = %url,
                    attempts = attempts.len() + 1,
                    "endpoint resolved"
                );
                return Ok(ResolvedEndpoint {
                    candidate: candidate.clone(),
                    url,
                    status,
                    body,
                    attempts: attempts.len() + 1,
                });
            }

            warn!(url = %url, status = status.as_u16(), body = %body, "endpoint candidate rejected");
            attempt.status = Some(status.as_u16());
            attempt.body = body;
            attempts.push(attempt);
        }

        let (last_status, last_body) = attempts
            .last()
            .map(|attempt| (attempt.status, attempt.body.clone()))
            .unwrap_or((None, "candidate table is empty".to_string()));

        Err(ProviderError::EndpointNotFound {
            operation: table.operation().to_string(),
            last_status,
            last_body,
            attempts,
        })
    }
}

fn params_object(params: &[(&str, &str)]) -> serde_json::Map<String, serde_json::Value> {
    params
        .iter()
        .map(|(key, value)| (key.to_string(), serde_json::Value::String(value.to_string())))
        .collect()
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
