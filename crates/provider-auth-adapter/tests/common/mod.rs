/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for provider-auth-adapter tests

use provider_auth_adapter::{AuthSettings, TypedDataChallenge};
use secrecy::Secret;
use wiremock::MockServer;

/// Hardhat's first development key and its address
#[allow(dead_code)]
pub const TEST_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
#[allow(dead_code)]
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
#[allow(dead_code)]
pub const TEST_CLIENT_ID: &str = "HackathonClient";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Auth settings pointing at the mock server
#[allow(dead_code)]
pub fn auth_settings(server: &MockServer, address: &str) -> AuthSettings {
    AuthSettings {
        api_base: format!("{}/", server.uri()),
        client_id: TEST_CLIENT_ID.to_string(),
        user_address: address.to_string(),
        private_key: Secret::new(TEST_PRIVATE_KEY.to_string()),
    }
}

/// Login challenge as the provider serves it
#[allow(dead_code)]
pub fn login_challenge_json() -> serde_json::Value {
    serde_json::json!({
        "domain": {
            "name": "Provider Auth",
            "version": "1",
            "chainId": 42161,
            "verifyingContract": "0x0000000000000000000000000000000000000001"
        },
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Login": [
                {"name": "address", "type": "address"},
                {"name": "clientId", "type": "string"},
                {"name": "timestamp", "type": "uint256"}
            ]
        },
        "message": {
            "address": TEST_ADDRESS,
            "clientId": TEST_CLIENT_ID,
            "timestamp": 1700000000
        },
        "primaryType": "Login"
    })
}

#[allow(dead_code)]
pub fn login_challenge() -> TypedDataChallenge {
    serde_json::from_value(login_challenge_json()).expect("fixture challenge")
}
