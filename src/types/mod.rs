//! Core types for CRE requests and x402 payments
//!
//! # Architecture
//!
//! - [`constants`] - Network, scheme and JSON-RPC constants
//! - [`gateway`] - CRE gateway configuration and the `workflows.execute` envelope
//! - [`payment`] - x402 payment requirements, payloads and 402 bodies
//! - [`facilitator`] - Facilitator configuration and response types
//!
//! # Examples
//!
//! ## Pricing a request
//!
//! ```
//! use mindchain_cre::types::{PaymentOptions, networks};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! # fn example() -> mindchain_cre::Result<()> {
//! let options = PaymentOptions::new(
//!     Decimal::from_str("0.01").unwrap(),
//!     "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//! );
//! let requirements = options.to_requirements()?;
//! assert_eq!(requirements.amount, "10000");
//! assert_eq!(requirements.network, networks::BASE_SEPOLIA);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod facilitator;
pub mod gateway;
pub mod payment;

// Re-export commonly used types
pub use constants::{cre, networks, schemes};
pub use facilitator::{
    FacilitatorConfig, SettleResponse, SupportedKind, SupportedKinds, VerifyResponse,
    DEFAULT_FACILITATOR_URL,
};
pub use gateway::{GatewayConfig, JsonRpcRequest, WorkflowParams, WorkflowSelector};
pub use payment::{
    parse_payment_signature, usd_to_usdc, AssetAmount, PaymentOptions, PaymentPayload,
    PaymentRequired, PaymentRequirements, ResourceInfo, PAYMENT_RESPONSE_HEADER,
    PAYMENT_SIGNATURE_HEADERS, X402_VERSION,
};
