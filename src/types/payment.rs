//! Payment-related types (x402 v2)

use super::constants::{networks, schemes};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// x402 protocol version
pub const X402_VERSION: u32 = 2;

/// Default time a client has to complete a payment, in seconds
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u32 = 300;

/// USDC atomic units per dollar
const USDC_UNITS_PER_DOLLAR: u64 = 1_000_000;

/// Header names a client may carry its payment signature in, in priority order
pub const PAYMENT_SIGNATURE_HEADERS: [&str; 2] = ["X-Payment-Signature", "Payment-Signature"];

/// Response header carrying the base64 settlement result
pub const PAYMENT_RESPONSE_HEADER: &str = "PAYMENT-RESPONSE";

/// A token amount in atomic units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAmount {
    /// Token contract address
    pub asset: String,
    /// Amount in atomic units
    pub amount: String,
    /// Token metadata (EIP-712 domain name and version)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Convert a USD price into USDC atomic units, rounding down
///
/// One dollar is 1,000,000 units. Only Base Sepolia USDC is issued; the
/// testnet flag is accepted for parity with [`PaymentOptions`].
pub fn usd_to_usdc(price_usd: Decimal, _testnet: bool) -> crate::Result<AssetAmount> {
    if price_usd.is_sign_negative() {
        return Err(crate::CreError::config(format!(
            "Price cannot be negative: {}",
            price_usd
        )));
    }

    let amount = (price_usd * Decimal::from(USDC_UNITS_PER_DOLLAR)).floor();

    Ok(AssetAmount {
        asset: networks::USDC_BASE_SEPOLIA.to_string(),
        amount: amount.to_string(),
        extra: Some(json!({
            "name": "USDC",
            "version": "2",
        })),
    })
}

/// What a resource server charges for a request
#[derive(Debug, Clone)]
pub struct PaymentOptions {
    /// Price in US dollars
    pub price_usd: Decimal,
    /// Recipient wallet address
    pub pay_to: String,
    /// Whether to charge on a testnet
    pub testnet: bool,
}

impl PaymentOptions {
    /// Create new payment options on testnet
    pub fn new(price_usd: Decimal, pay_to: impl Into<String>) -> Self {
        Self {
            price_usd,
            pay_to: pay_to.into(),
            testnet: true,
        }
    }

    /// Set whether this is a testnet
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Network the payment settles on
    ///
    /// Only Base Sepolia is registered with the facilitator, so mainnet
    /// requests are priced there as well.
    pub fn network(&self) -> &'static str {
        networks::BASE_SEPOLIA
    }

    /// Build the requirements a payment must satisfy
    pub fn to_requirements(&self) -> crate::Result<PaymentRequirements> {
        let asset = usd_to_usdc(self.price_usd, self.testnet)?;
        Ok(PaymentRequirements {
            scheme: schemes::EXACT.to_string(),
            network: self.network().to_string(),
            asset: asset.asset,
            amount: asset.amount,
            pay_to: self.pay_to.clone(),
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
            extra: asset.extra.unwrap_or_else(|| json!({})),
        })
    }
}

/// Payment requirements for a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequirements {
    /// Payment scheme identifier (e.g., "exact")
    pub scheme: String,
    /// CAIP-2 network identifier (e.g., "eip155:84532")
    pub network: String,
    /// Token contract address
    pub asset: String,
    /// Required amount in atomic token units
    pub amount: String,
    /// Recipient wallet address
    #[serde(rename = "payTo")]
    pub pay_to: String,
    /// Maximum time allowed for payment completion in seconds
    #[serde(rename = "maxTimeoutSeconds")]
    pub max_timeout_seconds: u32,
    /// Scheme-specific additional information
    #[serde(default)]
    pub extra: Value,
}

/// Description of the resource being paid for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ResourceInfo {
    /// Describe a JSON resource at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            mime_type: Some("application/json".to_string()),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body of an HTTP 402 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequired {
    /// Protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    /// Why the request was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The resource being paid for
    pub resource: ResourceInfo,
    /// Acceptable payment methods
    pub accepts: Vec<PaymentRequirements>,
}

impl PaymentRequired {
    /// Create a payment required body for a single payment method
    pub fn new(resource: ResourceInfo, requirements: PaymentRequirements) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: None,
            resource,
            accepts: vec![requirements],
        }
    }

    /// Set the error message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Payment payload sent by the client in the payment signature header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// Protocol version identifier
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    /// The resource the payment is for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceInfo>,
    /// The requirements the client chose to satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<PaymentRequirements>,
    /// Scheme-specific signed authorization
    pub payload: Value,
    /// Protocol extensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl PaymentPayload {
    /// Create a new payment payload
    pub fn new(accepted: PaymentRequirements, payload: Value) -> Self {
        Self {
            x402_version: X402_VERSION,
            resource: None,
            accepted: Some(accepted),
            payload,
            extensions: None,
        }
    }

    /// Decode a base64-encoded payment payload
    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        use base64::{engine::general_purpose, Engine as _};
        let decoded = general_purpose::STANDARD.decode(encoded.trim())?;
        let payload: PaymentPayload = serde_json::from_slice(&decoded)?;
        Ok(payload)
    }

    /// Encode the payment payload to base64
    pub fn to_base64(&self) -> crate::Result<String> {
        use base64::{engine::general_purpose, Engine as _};
        let json = serde_json::to_string(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Payer address, when the scheme payload carries an authorization
    pub fn payer(&self) -> Option<&str> {
        self.payload
            .get("authorization")
            .and_then(|auth| auth.get("from"))
            .and_then(Value::as_str)
    }
}

/// Read the payment payload from request headers
///
/// Headers that are present but cannot be decoded are logged and treated as
/// absent.
pub fn parse_payment_signature(headers: &http::HeaderMap) -> Option<PaymentPayload> {
    let signature = PAYMENT_SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())?;

    match PaymentPayload::from_base64(signature) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!("Failed to decode payment signature: {}", e);
            None
        }
    }
}
