//! Cryptographic utilities for CRE request authentication
//!
//! This module turns an arbitrary JSON request body into a bearer token the CRE
//! workflow gateway can check without any shared state, and implements the
//! matching verifier.
//!
//! # Architecture
//!
//! - [`canonical`] - Canonical JSON form and SHA-256 body digest
//! - [`base64url`] - Unpadded base64url segments
//! - [`signature`] - Ethereum personal-message signing and signer recovery
//! - [`token`] - Credential construction and the [`RequestAuthenticator`]
//! - [`verify`] - Gateway-side token verification
//!
//! # Examples
//!
//! ## Authenticating a request body
//!
//! ```no_run
//! use mindchain_cre::crypto::RequestAuthenticator;
//! use mindchain_cre::wallet::{MessageSigner, Wallet};
//! use serde_json::json;
//!
//! # async fn example() -> mindchain_cre::Result<()> {
//! let wallet = Wallet::from_private_key("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")?;
//! let body = json!({"jsonrpc": "2.0", "method": "workflows.execute"});
//!
//! let token = RequestAuthenticator::new()
//!     .authenticate(&body, &wallet, &wallet.address())
//!     .await?;
//! println!("Authorization: Bearer {}", token);
//! # Ok(())
//! # }
//! ```
//!
//! ## Digests are independent of key order
//!
//! ```
//! use mindchain_cre::crypto::digest;
//! use serde_json::json;
//!
//! let a = digest(&json!({"b": 2, "a": 1})).unwrap();
//! let b = digest(&json!({"a": 1, "b": 2})).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.len(), 66);
//! ```

pub mod base64url;
pub mod canonical;
pub mod signature;
pub mod token;
pub mod verify;


// Re-export commonly used items
pub use canonical::{canonical_json, canonicalize, digest, to_body};
pub use token::{
    bearer_header, build_credential, sign, Credential, RequestAuthenticator, TokenHeader,
    DEFAULT_TTL_SECONDS,
};
pub use verify::{ParsedToken, TokenVerifier};
