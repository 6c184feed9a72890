/*
[INPUT]:  Auth settings and wallet private key
[OUTPUT]: Typed-data signatures, token pairs, and auth errors
[POS]:    Auth layer - handles provider EIP-712 authentication
[UPDATE]: When auth flow or signature methods change
*/

pub mod evm_wallet;
pub mod manager;
pub mod wallet;

pub use evm_wallet::{EvmWalletSigner, derive_address, signing_hash};
pub use manager::{AuthManager, LOGIN_PATH};
pub use wallet::{MockTypedDataSigner, TypedDataSigner};
