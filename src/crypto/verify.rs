//! Gateway-side verification of bearer tokens

use super::token::{Credential, TokenHeader, TOKEN_ALG, TOKEN_TYP};
use super::{base64url, canonical, signature};
use crate::{CreError, Result};
use ethereum_types::Address;
use serde_json::Value;

/// A token split into its decoded parts
#[derive(Debug, Clone)]
pub struct ParsedToken {
    pub header: TokenHeader,
    pub payload: Credential,
    /// The raw `header.payload` string the signature covers
    pub signing_input: String,
    pub signature: Vec<u8>,
}

impl ParsedToken {
    /// Parse a token, with or without a `Bearer ` prefix
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        let segments: Vec<&str> = token.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(CreError::invalid_token(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        let header: TokenHeader = decode_segment(header_b64, "header")?;
        if header.alg != TOKEN_ALG || header.typ != TOKEN_TYP {
            return Err(CreError::invalid_token(format!(
                "unsupported header alg={} typ={}",
                header.alg, header.typ
            )));
        }

        let payload: Credential = decode_segment(payload_b64, "payload")?;
        let signature = base64url::decode(signature_b64)
            .map_err(|e| CreError::invalid_token(format!("signature segment: {}", e)))?;

        Ok(Self {
            header,
            payload,
            signing_input: format!("{}.{}", header_b64, payload_b64),
            signature,
        })
    }

    /// Recover the address that signed the token
    ///
    /// A 64-byte `r ‖ s` signature carries no recovery id; both candidates
    /// are tried and the one matching the claimed issuer wins.
    pub fn recover_signer(&self) -> Result<Address> {
        let message = self.signing_input.as_bytes();
        match self.signature.len() {
            65 => signature::recover_personal_signer(message, &self.signature),
            64 => {
                let claimed = signature::parse_address(&self.payload.iss).ok();
                let mut first = None;
                for recovery_id in 0..2u8 {
                    if let Ok(address) =
                        signature::recover_with_id(message, &self.signature, recovery_id)
                    {
                        if Some(address) == claimed {
                            return Ok(address);
                        }
                        first.get_or_insert(address);
                    }
                }
                first.ok_or_else(|| CreError::invalid_signature("Failed to recover public key"))
            }
            n => Err(CreError::invalid_signature(format!(
                "Signature must be 64 or 65 bytes, got {}",
                n
            ))),
        }
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str, name: &str) -> Result<T> {
    let bytes = base64url::decode(segment)
        .map_err(|e| CreError::invalid_token(format!("{} segment: {}", name, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CreError::invalid_token(format!("{} segment: {}", name, e)))
}

/// Checks bearer tokens against the transmitted body
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenVerifier;

impl TokenVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify a token against `body` at the current time
    pub fn verify(&self, token: &str, body: &Value) -> Result<Credential> {
        self.verify_at(token, body, chrono::Utc::now().timestamp())
    }

    /// Verify a token against `body` at `now`
    pub fn verify_at(&self, token: &str, body: &Value, now: i64) -> Result<Credential> {
        let parsed = ParsedToken::parse(token)?;
        let payload = &parsed.payload;

        let recovered = parsed.recover_signer()?;
        let claimed = signature::parse_address(&payload.iss).map_err(|_| {
            CreError::invalid_token(format!("issuer is not an address: {}", payload.iss))
        })?;
        if recovered != claimed {
            return Err(CreError::SignerMismatch {
                claimed: payload.iss.clone(),
                recovered: signature::to_checksum_address(&recovered),
            });
        }

        let actual = canonical::digest(body)?;
        if actual != payload.digest {
            return Err(CreError::DigestMismatch {
                expected: payload.digest.clone(),
                actual,
            });
        }

        if !payload.is_valid_at(now) {
            return Err(CreError::ExpiredCredential {
                exp: payload.exp,
                now,
            });
        }

        tracing::debug!(iss = %payload.iss, jti = %payload.jti, "CRE credential verified");
        Ok(parsed.payload)
    }
}
