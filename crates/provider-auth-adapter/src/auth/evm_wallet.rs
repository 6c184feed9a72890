/*
[INPUT]:  EVM private key (hex string) and typed-data challenges
[OUTPUT]: EIP-712 signatures and the checksummed wallet address
[POS]:    Auth layer - EVM wallet implementation
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::str::FromStr;

use alloy_dyn_abi::TypedData;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::auth::TypedDataSigner;
use crate::http::{ProviderError, Result};
use crate::types::TypedDataChallenge;

/// Signer for EVM wallets
pub struct EvmWalletSigner {
    signer: PrivateKeySigner,
    address: String,
}

impl std::fmt::Debug for EvmWalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmWalletSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl EvmWalletSigner {
    /// Create a new EVM wallet signer from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = normalize_private_key(private_key_hex);
        // The parser's message never echoes the key material.
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| ProviderError::KeyFormat(e.to_string()))?;

        let address = signer.address().to_checksum(None);

        Ok(Self { signer, address })
    }

    pub fn from_secret(private_key: &SecretString) -> Result<Self> {
        Self::new(private_key.expose_secret())
    }
}

/// Address controlled by a private key, EIP-55 checksummed
pub fn derive_address(private_key_hex: &str) -> Result<String> {
    Ok(EvmWalletSigner::new(private_key_hex)?.address)
}

/// EIP-712 signing hash of a challenge
pub fn signing_hash(challenge: &TypedDataChallenge) -> Result<alloy_primitives::B256> {
    challenge.validate()?;
    let value = serde_json::to_value(challenge)?;
    let typed_data: TypedData = serde_json::from_value(value)
        .map_err(|e| ProviderError::Challenge(format!("not valid EIP-712 typed data: {e}")))?;
    typed_data
        .eip712_signing_hash()
        .map_err(|e| ProviderError::Challenge(format!("cannot encode typed data: {e}")))
}

fn normalize_private_key(key: &str) -> &str {
    let key = key.trim();
    key.strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key)
}

#[async_trait]
impl TypedDataSigner for EvmWalletSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_typed_data(&self, challenge: &TypedDataChallenge) -> Result<String> {
        let hash = signing_hash(challenge)?;
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| ProviderError::Signing(format!("Failed to sign typed data: {e}")))?;

        // alloy's Signature as_bytes() returns [r, s, v]
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Signature, b256};

    // keccak256("cow"), the key used by the EIP-712 reference example
    const COW_KEY: &str = "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";
    const COW_ADDRESS: &str = "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826";

    fn mail_challenge() -> TypedDataChallenge {
        serde_json::from_value(serde_json::json!({
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"}
                ],
                "Person": [
                    {"name": "name", "type": "string"},
                    {"name": "wallet", "type": "address"}
                ],
                "Mail": [
                    {"name": "from", "type": "Person"},
                    {"name": "to", "type": "Person"},
                    {"name": "contents", "type": "string"}
                ]
            },
            "primaryType": "Mail",
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
            },
            "message": {
                "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
                "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
                "contents": "Hello, Bob!"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_evm_wallet_signer_prefixes() {
        let pk = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let signer = EvmWalletSigner::new(pk).unwrap();
        assert_eq!(signer.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        let bare = EvmWalletSigner::new(&pk[2..]).unwrap();
        assert_eq!(bare.address(), signer.address());

        let padded = format!("  0X{}\n", &pk[2..]);
        assert_eq!(derive_address(&padded).unwrap(), signer.address());
    }

    #[test]
    fn test_invalid_key_is_key_format_error() {
        for key in ["", "0x1234", "zz0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"] {
            let err = EvmWalletSigner::new(key).unwrap_err();
            assert!(matches!(err, ProviderError::KeyFormat(_)), "key {key:?}");
        }
    }

    #[test]
    fn test_derive_address_reference_key() {
        assert_eq!(derive_address(COW_KEY).unwrap(), COW_ADDRESS);
    }

    #[test]
    fn test_signing_hash_matches_reference_example() {
        let hash = signing_hash(&mail_challenge()).unwrap();
        assert_eq!(
            hash,
            b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
    }

    #[tokio::test]
    async fn test_sign_typed_data_recovers_signer() {
        let signer = EvmWalletSigner::new(COW_KEY).unwrap();
        let challenge = mail_challenge();

        let signature = signer.sign_typed_data(&challenge).await.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 132); // 0x + 65 bytes * 2 = 132

        let bytes = hex::decode(&signature[2..]).unwrap();
        let parsed = Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = parsed
            .recover_address_from_prehash(&signing_hash(&challenge).unwrap())
            .unwrap();
        assert_eq!(recovered.to_checksum(None), COW_ADDRESS);

        // RFC 6979 nonces make the signature deterministic
        assert_eq!(signer.sign_typed_data(&challenge).await.unwrap(), signature);
    }
}
