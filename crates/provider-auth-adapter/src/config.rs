/*
[INPUT]:  PROVIDER_* environment variables (or an explicit key/value map)
[OUTPUT]: Validated settings for the auth flow and the authenticated client
[POS]:    Configuration layer - built once at startup, passed by reference
[UPDATE]: When adding new environment variables
*/

use std::collections::HashMap;
use std::time::Duration;

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;

use crate::http::{ProviderError, Result};

pub const ENV_PREFIX: &str = "PROVIDER";
pub const ENV_API_BASE: &str = "PROVIDER_API_BASE";
pub const ENV_CLIENT_ID: &str = "PROVIDER_CLIENT_ID";
pub const ENV_USER_ADDRESS: &str = "PROVIDER_USER_ADDRESS";
pub const ENV_USER_PRIVATE_KEY: &str = "PROVIDER_USER_PRIVATE_KEY";
pub const ENV_ACCESS_TOKEN: &str = "PROVIDER_ACCESS_TOKEN";
/// Not read by this crate; named in the login output for the caller's .env
pub const ENV_REFRESH_TOKEN: &str = "PROVIDER_REFRESH_TOKEN";

/// Everything the environment may provide, before validation
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub api_base: Option<String>,
    pub client_id: Option<String>,
    pub user_address: Option<String>,
    pub user_private_key: Option<SecretString>,
    pub access_token: Option<SecretString>,
}

impl RawSettings {
    /// Read `PROVIDER_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Read `PROVIDER_*` keys from an explicit map instead of the environment
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Some(vars))
    }

    fn load(source: Option<HashMap<String, String>>) -> Result<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .ignore_empty(true)
            .source(source);

        Config::builder()
            .add_source(environment)
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ProviderError::Configuration(format!("failed to read settings: {e}")))
    }

    /// Settings for the one-shot login flow
    pub fn into_auth_settings(self) -> Result<AuthSettings> {
        let mut missing = Vec::new();
        let api_base = require(self.api_base, ENV_API_BASE, &mut missing);
        let client_id = require(self.client_id, ENV_CLIENT_ID, &mut missing);
        let user_address = require(self.user_address, ENV_USER_ADDRESS, &mut missing);
        let private_key = require(self.user_private_key, ENV_USER_PRIVATE_KEY, &mut missing);

        match (api_base, client_id, user_address, private_key) {
            (Some(api_base), Some(client_id), Some(user_address), Some(private_key)) => {
                Ok(AuthSettings {
                    api_base,
                    client_id,
                    user_address,
                    private_key,
                })
            }
            _ => Err(missing_error(&missing)),
        }
    }

    /// Settings for the authenticated request client
    pub fn into_api_settings(self) -> Result<ApiSettings> {
        let mut missing = Vec::new();
        let api_base = require(self.api_base, ENV_API_BASE, &mut missing);
        let access_token = require(self.access_token, ENV_ACCESS_TOKEN, &mut missing);

        match (api_base, access_token) {
            (Some(api_base), Some(access_token)) => Ok(ApiSettings {
                api_base,
                access_token,
            }),
            _ => Err(missing_error(&missing)),
        }
    }
}

fn require<T>(value: Option<T>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn missing_error(missing: &[&'static str]) -> ProviderError {
    ProviderError::Configuration(format!(
        "missing required environment variables: {}",
        missing.join(", ")
    ))
}

/// Identity and endpoint settings for the login flow
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub api_base: String,
    pub client_id: String,
    pub user_address: String,
    pub private_key: SecretString,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self> {
        RawSettings::from_env()?.into_auth_settings()
    }
}

/// Base URL and bearer token for authenticated calls
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_base: String,
    pub access_token: SecretString,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self> {
        RawSettings::from_env()?.into_api_settings()
    }
}

/// HTTP transport configuration
///
/// Timeouts are unset by default so the transport's own defaults apply.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// Discovery sweep configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Probe the bare base URL once before the sweep and log its status
    pub reachability_check: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reachability_check: true,
        }
    }
}
