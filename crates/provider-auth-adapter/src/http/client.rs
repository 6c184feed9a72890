/*
[INPUT]:  API settings (base URL, access token) and transport configuration
[OUTPUT]: Bearer-authenticated requests against the provider
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing header decoration
*/

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Request, Response, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::{ApiSettings, ClientConfig};
use crate::http::{ProviderError, Result};

/// Build the shared reqwest client
pub fn build_http_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    Ok(builder.build()?)
}

/// Base URL without any trailing separator
pub(crate) fn trim_base(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

/// Join base and path with exactly one separator between them
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", trim_base(base), path)
    } else {
        format!("{}/{}", trim_base(base), path)
    }
}

/// Options for a single authenticated call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Serialize `value` as the body; the content type is left to the client
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Client that decorates every request with the bearer token
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http_client: Client,
    base_url: String,
    access_token: SecretString,
}

impl ProviderClient {
    /// Create a new client with default configuration
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        Self::with_config(settings, &ClientConfig::default())
    }

    /// Create a new client with custom transport configuration
    pub fn with_config(settings: &ApiSettings, config: &ClientConfig) -> Result<Self> {
        if settings.api_base.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "API base URL is empty".to_string(),
            ));
        }
        if settings.access_token.expose_secret().trim().is_empty() {
            return Err(ProviderError::Configuration(
                "access token is empty".to_string(),
            ));
        }

        let base_url = trim_base(&settings.api_base).to_string();
        Url::parse(&base_url)?;

        Ok(Self {
            http_client: build_http_client(config)?,
            base_url,
            access_token: settings.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Build the decorated request without sending it
    ///
    /// `Authorization` always carries the configured token, replacing any
    /// caller value. A JSON content type is added only for requests with a
    /// body and no caller-supplied content type.
    pub fn build_request(&self, path: &str, options: RequestOptions) -> Result<Request> {
        let RequestOptions {
            method,
            mut headers,
            body,
        } = options;

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", self.access_token.expose_secret()))
                .map_err(|_| {
                    ProviderError::Configuration(
                        "access token is not a valid header value".to_string(),
                    )
                })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut builder = self
            .http_client
            .request(method, self.url_for(path))
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        Ok(builder.build()?)
    }

    /// Send one authenticated request and return the raw response
    ///
    /// Status codes are not interpreted here; transport errors propagate.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Response> {
        let request = self.build_request(path, options)?;
        debug!(method = %request.method(), url = %request.url(), "provider request");
        Ok(self.http_client.execute(request).await?)
    }
}
