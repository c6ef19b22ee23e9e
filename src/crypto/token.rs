//! Bearer tokens for the CRE workflow gateway
//!
//! A token binds a request body to the identity that signed it:
//!
//! ```text
//! b64url({"alg":"ETH","typ":"JWT"}) . b64url({digest,iss,iat,exp,jti}) . b64url(r‖s‖v)
//! ```
//!
//! The signature covers the first two segments joined by `.`, hashed with the
//! Ethereum personal-message prefix. The gateway recomputes the body digest,
//! recovers the signer, and checks expiry; see [`super::verify`].

use super::{base64url, canonical};
use crate::wallet::MessageSigner;
use crate::{CreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signature algorithm sentinel: ECDSA over the personal-message hash
pub const TOKEN_ALG: &str = "ETH";
/// Token type sentinel
pub const TOKEN_TYP: &str = "JWT";
/// Default credential lifetime in seconds
pub const DEFAULT_TTL_SECONDS: i64 = 300;

/// First token segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: TOKEN_ALG.to_string(),
            typ: TOKEN_TYP.to_string(),
        }
    }
}

/// Claims carried in the second token segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Digest of the canonical request body
    pub digest: String,
    /// Issuer address
    pub iss: String,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl Credential {
    /// Whether the credential is still valid at `now`
    pub fn is_valid_at(&self, now: i64) -> bool {
        now <= self.exp
    }
}

/// Build the claims for `body` issued by `identity` at `now`
///
/// `ttl_seconds` must be positive and `now + ttl_seconds` must fit in an `i64`.
pub fn build_credential(
    body: &Value,
    identity: &str,
    now: i64,
    ttl_seconds: i64,
) -> Result<Credential> {
    if ttl_seconds <= 0 {
        return Err(CreError::config(format!(
            "Token lifetime must be positive, got {}",
            ttl_seconds
        )));
    }
    let exp = now.checked_add(ttl_seconds).ok_or_else(|| {
        CreError::config(format!(
            "Token lifetime {} overflows issue time {}",
            ttl_seconds, now
        ))
    })?;

    Ok(Credential {
        digest: canonical::digest(body)?,
        iss: identity.to_string(),
        iat: now,
        exp,
        jti: uuid::Uuid::new_v4().to_string(),
    })
}

/// The `header.payload` string the signature covers
pub fn signing_input(header: &TokenHeader, payload: &Credential) -> Result<String> {
    let encoded_header = base64url::encode(serde_json::to_vec(header)?);
    let encoded_payload = base64url::encode(serde_json::to_vec(payload)?);
    Ok(format!("{}.{}", encoded_header, encoded_payload))
}

/// Sign the header and payload, producing the complete token
pub async fn sign<S>(header: &TokenHeader, payload: &Credential, signer: &S) -> Result<String>
where
    S: MessageSigner + ?Sized,
{
    let message = signing_input(header, payload)?;

    let signature = signer.sign_message(&message).await.map_err(|e| match e {
        CreError::Signing(_) => e,
        other => CreError::signing(other.to_string()),
    })?;

    if signature.len() != 64 && signature.len() != 65 {
        return Err(CreError::signing(format!(
            "Signer returned {} bytes, expected 64 or 65",
            signature.len()
        )));
    }

    Ok(format!("{}.{}", message, base64url::encode(&signature)))
}

/// Produces bearer tokens for request bodies
#[derive(Debug, Clone, Copy)]
pub struct RequestAuthenticator {
    ttl_seconds: i64,
}

impl Default for RequestAuthenticator {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl RequestAuthenticator {
    /// Create an authenticator with the default five minute lifetime
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credential lifetime
    ///
    /// A lifetime that is not positive fails when a token is issued.
    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Credential lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Authenticate `body` as `identity`, issued now
    pub async fn authenticate<S>(&self, body: &Value, signer: &S, identity: &str) -> Result<String>
    where
        S: MessageSigner + ?Sized,
    {
        let now = chrono::Utc::now().timestamp();
        self.authenticate_at(body, signer, identity, now).await
    }

    /// Authenticate `body` as `identity`, issued at `now`
    pub async fn authenticate_at<S>(
        &self,
        body: &Value,
        signer: &S,
        identity: &str,
        now: i64,
    ) -> Result<String>
    where
        S: MessageSigner + ?Sized,
    {
        let payload = build_credential(body, identity, now, self.ttl_seconds)?;
        tracing::debug!(
            digest = %payload.digest,
            iss = %payload.iss,
            exp = payload.exp,
            jti = %payload.jti,
            "Signing CRE credential"
        );
        sign(&TokenHeader::default(), &payload, signer).await
    }
}

/// Format a token as an `Authorization` header value
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}
