/*
[INPUT]:  Auth settings, wallet signer and HTTP client
[OUTPUT]: Access/refresh token pair with its expiry
[POS]:    Auth layer - orchestrates complete authentication flow
[UPDATE]: When auth endpoints or flow steps change
*/

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use reqwest::{Client, Url};
use reqwest::header::ACCEPT;
use tracing::{info, warn};

use crate::config::{AuthSettings, ClientConfig, ResolverConfig};
use crate::http::client::{build_http_client, join_url, trim_base};
use crate::http::{CandidateTable, EndpointResolver, ProviderError, Result};
use crate::types::{AuthState, ChallengeParams, IssuedTokens, LoginRequest, TokenPair, TypedDataChallenge};

use super::{EvmWalletSigner, TypedDataSigner};

/// Path of the login endpoint
pub const LOGIN_PATH: &str = "/auth/login";

/// Runs challenge-fetch, sign and login against one provider
///
/// Steps are strictly sequential: the challenge is time-bound and single-use,
/// so signing follows its receipt without any pause.
#[derive(Debug)]
pub struct AuthManager {
    http_client: Client,
    resolver: EndpointResolver,
    challenge_table: CandidateTable,
    settings: AuthSettings,
    state: RwLock<AuthState>,
}

impl AuthManager {
    /// Create a new auth manager with default transport and resolver settings
    pub fn new(settings: AuthSettings) -> Result<Self> {
        Self::with_config(settings, &ClientConfig::default(), ResolverConfig::default())
    }

    pub fn with_config(
        settings: AuthSettings,
        client_config: &ClientConfig,
        resolver_config: ResolverConfig,
    ) -> Result<Self> {
        Url::parse(trim_base(&settings.api_base))?;
        let http_client = build_http_client(client_config)?;
        let resolver = EndpointResolver::new(http_client.clone(), &settings.api_base, resolver_config);

        Ok(Self {
            http_client,
            resolver,
            challenge_table: CandidateTable::challenge(),
            settings,
            state: RwLock::new(AuthState::Idle),
        })
    }

    /// Replace the challenge candidate table
    pub fn with_challenge_table(mut self, table: CandidateTable) -> Self {
        self.challenge_table = table;
        self
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Current state of the run
    pub fn state(&self) -> AuthState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: AuthState) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        info!(from = ?*guard, to = ?next, "auth state transition");
        *guard = next;
    }

    /// Move to `next` on success, to `Failed` on error
    fn advance<T>(&self, result: Result<T>, next: AuthState) -> Result<T> {
        match result {
            Ok(value) => {
                self.set_state(next);
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, state = ?self.state(), "auth run failed");
                self.set_state(AuthState::Failed);
                Err(err)
            }
        }
    }

    /// Step 1: Fetch the typed-data challenge through the discovery sweep
    pub async fn fetch_challenge(&self) -> Result<TypedDataChallenge> {
        let params = ChallengeParams {
            address: self.settings.user_address.clone(),
            client_id: self.settings.client_id.clone(),
        };

        let resolved = self
            .resolver
            .resolve(&self.challenge_table, &params.as_pairs())
            .await?;

        let challenge = TypedDataChallenge::from_json(&resolved.body)?;
        info!(
            url = %resolved.url,
            primary_type = %challenge.primary_type,
            "received typed-data challenge"
        );
        Ok(challenge)
    }

    /// Step 2: Check the signer controls the configured address, then sign
    pub async fn sign_challenge(
        &self,
        wallet: &dyn TypedDataSigner,
        challenge: &TypedDataChallenge,
    ) -> Result<String> {
        verify_wallet_address(&self.settings.user_address, wallet.address())?;
        let signature = wallet.sign_typed_data(challenge).await?;
        info!(address = wallet.address(), "challenge signed");
        Ok(signature)
    }

    /// Step 3: Exchange the signature for tokens
    ///
    /// POST /auth/login
    pub async fn login(&self, signature: &str, challenge: &TypedDataChallenge) -> Result<TokenPair> {
        let body = LoginRequest::eip712(
            self.settings.user_address.as_str(),
            self.settings.client_id.as_str(),
            signature,
            challenge.echoed_fields(),
        );

        let url = join_url(&self.settings.api_base, LOGIN_PATH);
        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::login_rejected(status, text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::login_rejected(status, format!("unreadable token response ({e}): {text}"))
        })
    }

    /// Complete authentication flow with the configured private key
    pub async fn authenticate(&self) -> Result<IssuedTokens> {
        self.run(None).await
    }

    /// Complete authentication flow with an externally supplied signer
    pub async fn authenticate_with(&self, wallet: &dyn TypedDataSigner) -> Result<IssuedTokens> {
        self.run(Some(wallet)).await
    }

    async fn run(&self, wallet: Option<&dyn TypedDataSigner>) -> Result<IssuedTokens> {
        self.set_state(AuthState::Idle);

        let challenge = self
            .advance(self.fetch_challenge().await, AuthState::ChallengeFetched)?;

        let signature = match wallet {
            Some(wallet) => self.sign_challenge(wallet, &challenge).await,
            None => match EvmWalletSigner::from_secret(&self.settings.private_key) {
                Ok(wallet) => self.sign_challenge(&wallet, &challenge).await,
                Err(err) => Err(err),
            },
        };
        let signature = self.advance(signature, AuthState::Signed)?;

        let tokens = self.advance(
            self.login(&signature, &challenge).await,
            AuthState::Authenticated,
        )?;

        let issued = IssuedTokens::new(tokens, Utc::now());
        info!(expires_at = ?issued.expires_at, "authentication successful");
        Ok(issued)
    }
}

fn normalize_evm_address(address: &str) -> String {
    let address = address.trim();
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .to_ascii_lowercase()
}

/// Addresses are hex identifiers, compared case-insensitively
fn verify_wallet_address(expected: &str, derived: &str) -> Result<()> {
    if normalize_evm_address(expected) == normalize_evm_address(derived) {
        Ok(())
    } else {
        Err(ProviderError::IdentityMismatch {
            configured: expected.to_string(),
            derived: derived.to_string(),
        })
    }
}
