//! # MindChain CRE
//!
//! Request authentication for the Chainlink CRE workflow gateway, and the x402
//! pay-per-request plumbing that sits in front of it.
//!
//! ## Features
//!
//! - 🔏 **Signed requests**: every gateway call carries a JWT-shaped bearer token
//!   signed with an Ethereum key, bound to a digest of the exact request body
//! - 🧾 **Canonical digests**: key order and whitespace never change a body's digest
//! - ✅ **Verification**: the gateway-side check (signer, digest, expiry) lives here too
//! - 💰 **x402 payments**: facilitator client and a resource server that prices
//!   requests in USDC
//! - 🌐 **HTTP service**: an Axum app charging per `/agent/query` call (feature `axum`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mindchain_cre::{gateway::GatewayClient, types::GatewayConfig, wallet::Wallet};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wallet = Wallet::from_env()?;
//!     let client = GatewayClient::new(GatewayConfig::from_env()?, Arc::new(wallet))?;
//!
//!     let result = client
//!         .execute(json!({"query": "What is MindChain?"}))
//!         .await?;
//!     println!("{}", result);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`crypto`**: canonical JSON, tokens, signing and verification
//! - **`wallet`**: the [`MessageSigner`] seam and a local key implementation
//! - **`gateway`**: CRE workflow client
//! - **`facilitator`**: x402 facilitator client and [`ResourceServer`]
//! - **`types`**: configuration and wire types
//! - **`error`**: the crate error type
//! - **`server`**: HTTP service (feature-gated)

pub mod crypto;
pub mod error;
pub mod facilitator;
pub mod gateway;
pub mod types;
pub mod wallet;

#[cfg(feature = "axum")]
pub mod server;

// Re-exports for convenience
pub use crypto::{Credential, RequestAuthenticator, TokenVerifier};
pub use error::{CreError, Result};
pub use facilitator::{FacilitatorClient, ResourceServer};
pub use gateway::GatewayClient;
pub use wallet::{MessageSigner, Wallet};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
