/*
[INPUT]:  Typed-data challenge and wallet private key
[OUTPUT]: Signature string for authentication
[POS]:    Auth layer - wallet integration abstraction
[UPDATE]: When adding new wallet types or changing signature format
*/

use async_trait::async_trait;

use crate::http::Result;
use crate::types::TypedDataChallenge;

/// Trait for typed-data signing operations
///
/// The trait is async to support hardware wallets and external signers.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// Get the wallet address
    fn address(&self) -> &str;

    /// Sign the challenge's (domain, types, message) and return `0x`-prefixed hex
    async fn sign_typed_data(&self, challenge: &TypedDataChallenge) -> Result<String>;
}

/// Mock wallet signer for testing
#[derive(Debug, Clone)]
pub struct MockTypedDataSigner {
    address: String,
    signature: String,
}

impl MockTypedDataSigner {
    /// Create a new mock signer with predetermined signature
    pub fn new(address: &str, signature: &str) -> Self {
        Self {
            address: address.to_string(),
            signature: signature.to_string(),
        }
    }
}

#[async_trait]
impl TypedDataSigner for MockTypedDataSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_typed_data(&self, challenge: &TypedDataChallenge) -> Result<String> {
        challenge.validate()?;
        Ok(self.signature.clone())
    }
}
