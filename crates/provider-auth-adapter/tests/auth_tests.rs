/*
[INPUT]:  Mock challenge and login responses
[OUTPUT]: Test results for the end-to-end auth flow
[POS]:    Integration tests - authentication
[UPDATE]: When auth endpoints or flow changes
*/

mod common;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use common::{
    TEST_ADDRESS, TEST_CLIENT_ID, TEST_PRIVATE_KEY, auth_settings, login_challenge,
    login_challenge_json, setup_mock_server,
};
use provider_auth_adapter::config::{ENV_API_BASE, ENV_CLIENT_ID, ENV_USER_ADDRESS};
use provider_auth_adapter::{
    AuthManager, AuthState, ClientConfig, EvmWalletSigner, ProviderError, RawSettings,
    ResolverConfig, TypedDataSigner,
};
use tokio_test::assert_ok;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn manager(settings: provider_auth_adapter::AuthSettings) -> AuthManager {
    assert_ok!(AuthManager::with_config(
        settings,
        &ClientConfig::default(),
        ResolverConfig {
            reachability_check: false,
        },
    ))
}

#[tokio::test]
async fn test_end_to_end_login_echoes_timestamp() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/auth/eip712-message"))
        .and(query_param("address", TEST_ADDRESS))
        .and(query_param("clientId", TEST_CLIENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_challenge_json()))
        .expect(1)
        .mount(&server)
        .await;

    let wallet = assert_ok!(EvmWalletSigner::new(TEST_PRIVATE_KEY));
    let expected_signature = assert_ok!(wallet.sign_typed_data(&login_challenge()).await);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "method": "eip712",
            "address": TEST_ADDRESS,
            "clientId": TEST_CLIENT_ID,
            "details": {
                "signature": expected_signature,
                "address": TEST_ADDRESS,
                "clientId": TEST_CLIENT_ID,
                "timestamp": 1700000000
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "abc",
            "refreshToken": "def",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(auth_settings(&server, TEST_ADDRESS));
    let before = Utc::now();
    let issued = assert_ok!(manager.authenticate().await);
    let after = Utc::now();

    assert_eq!(issued.tokens.access_token, "abc");
    assert_eq!(issued.tokens.refresh_token, "def");
    assert_eq!(issued.tokens.expires_in, Some(3600));

    let expires_at = issued.expires_at.expect("expiry computed");
    assert!(expires_at >= before + Duration::seconds(3600));
    assert!(expires_at <= after + Duration::seconds(3600));
    assert_eq!(manager.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn test_lowercase_configured_address_is_accepted() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/eip712-message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_challenge_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "abc",
            "refreshToken": "def"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(auth_settings(&server, &TEST_ADDRESS.to_ascii_lowercase()));
    let issued = assert_ok!(manager.authenticate().await);
    assert!(issued.expires_at.is_none());
}

#[tokio::test]
async fn test_identity_mismatch_never_reaches_login() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/auth/eip712-message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_challenge_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager(auth_settings(
        &server,
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
    ));
    let err = manager.authenticate().await.unwrap_err();

    assert!(err.is_credential_error());
    assert!(matches!(err, ProviderError::IdentityMismatch { .. }));
    assert_eq!(manager.state(), AuthState::Failed);
}

#[tokio::test]
async fn test_exhausted_sweep_fails_without_login() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager(auth_settings(&server, TEST_ADDRESS));
    let err = manager.authenticate().await.unwrap_err();

    match err {
        ProviderError::EndpointNotFound {
            attempts,
            last_status,
            ..
        } => {
            assert_eq!(attempts.len(), 8);
            assert_eq!(last_status, Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(manager.state(), AuthState::Failed);
}

#[tokio::test]
async fn test_missing_private_key_fails_before_any_request() {
    let server = setup_mock_server().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let vars: HashMap<String, String> = [
        (ENV_API_BASE, server.uri()),
        (ENV_CLIENT_ID, TEST_CLIENT_ID.to_string()),
        (ENV_USER_ADDRESS, TEST_ADDRESS.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    // Same order as the login command: settings, then manager, then the run
    let result = match RawSettings::from_map(vars).and_then(RawSettings::into_auth_settings) {
        Ok(settings) => manager(settings).authenticate().await.map(|_| ()),
        Err(err) => Err(err),
    };

    let err = result.unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("PROVIDER_USER_PRIVATE_KEY"));
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}
