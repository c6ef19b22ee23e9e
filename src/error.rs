//! Error types for CRE request authentication and x402 plumbing

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, CreError>;

/// Errors produced while authenticating, verifying, or sending requests
#[derive(Debug, Error)]
pub enum CreError {
    /// The request body cannot be represented as canonical JSON
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The signer was unavailable, rejected the request, or failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The credential's expiry is in the past
    #[error("Credential expired at {exp} (now {now})")]
    ExpiredCredential { exp: i64, now: i64 },

    /// The body digest does not match the digest claimed by the credential
    #[error("Digest mismatch: token claims {expected}, body hashes to {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// The recovered signer does not match the credential issuer
    #[error("Signer mismatch: token issued by {claimed}, signed by {recovered}")]
    SignerMismatch { claimed: String, recovered: String },

    /// The bearer token is structurally invalid
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// A signature or key could not be parsed or recovered
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The CRE gateway rejected or failed the request
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The x402 facilitator rejected or failed the request
    #[error("Facilitator error: {0}")]
    Facilitator(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl CreError {
    /// Create a malformed input error
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Create a signing error
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing(message.into())
    }

    /// Create an invalid token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(message.into())
    }

    /// Create an invalid signature error
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a gateway error
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// Create a facilitator error
    pub fn facilitator_error(message: impl Into<String>) -> Self {
        Self::Facilitator(message.into())
    }

    /// Whether the error is a verifier-side rejection of a token
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ExpiredCredential { .. }
                | Self::DigestMismatch { .. }
                | Self::SignerMismatch { .. }
                | Self::InvalidToken(_)
                | Self::InvalidSignature(_)
        )
    }
}
