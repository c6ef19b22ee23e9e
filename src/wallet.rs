//! Message signers
//!
//! [`MessageSigner`] is the seam between token construction and whatever holds
//! the private key. A browser wallet may take seconds to answer (or never
//! answer), so signing is async and carries no timeout of its own; callers that
//! need one wrap the future in `tokio::time::timeout`.
//!
//! [`Wallet`] is the in-process implementation backed by a secp256k1 key.

use crate::crypto::signature;
use crate::{CreError, Result};
use rand::RngCore;
use secp256k1::SecretKey;

/// Holder of a private key able to sign arbitrary text messages
#[async_trait::async_trait]
pub trait MessageSigner: Send + Sync {
    /// Public identity (EIP-55 address) of the signer
    fn address(&self) -> String;

    /// Sign `message` with the personal-message prefix, returning the raw
    /// signature bytes (`r ‖ s ‖ v`)
    async fn sign_message(&self, message: &str) -> Result<Vec<u8>>;
}

/// Local wallet holding a secp256k1 private key
#[derive(Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    address: String,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl Wallet {
    /// Create a wallet from a hex private key, with or without `0x`
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let secret_key = signature::parse_secret_key(private_key)?;
        Self::from_secret_key(secret_key)
    }

    /// Create a wallet from an already parsed secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Result<Self> {
        let address = signature::address_from_secret_key(&secret_key)?;
        Ok(Self {
            secret_key,
            address: signature::to_checksum_address(&address),
        })
    }

    /// Generate a wallet with a fresh random key
    pub fn random() -> Result<Self> {
        let mut rng = rand::thread_rng();
        // A uniformly random 32-byte string is a valid scalar with overwhelming probability
        for _ in 0..8 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                return Self::from_secret_key(secret_key);
            }
        }
        Err(CreError::config("Failed to generate a private key"))
    }

    /// Create a wallet from the `CRE_PRIVATE_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("CRE_PRIVATE_KEY")
            .map_err(|_| CreError::config("CRE_PRIVATE_KEY must be set"))?;
        Self::from_private_key(&private_key)
    }
}

#[async_trait::async_trait]
impl MessageSigner for Wallet {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn sign_message(&self, message: &str) -> Result<Vec<u8>> {
        let signature = signature::sign_personal_message(message.as_bytes(), &self.secret_key)?;
        Ok(signature.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let prefixed = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(prefixed.address(), wallet.address());
    }

    #[test]
    fn test_debug_redacts_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(TEST_PRIVATE_KEY));
    }

    #[test]
    fn test_random_wallets_differ() {
        let a = Wallet::random().unwrap();
        let b = Wallet::random().unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[tokio::test]
    async fn test_sign_message_recovers_to_address() {
        let wallet = Wallet::random().unwrap();
        let sig = wallet.sign_message("header.payload").await.unwrap();
        assert_eq!(sig.len(), 65);

        let recovered = signature::recover_personal_signer(b"header.payload", &sig).unwrap();
        assert_eq!(signature::to_checksum_address(&recovered), wallet.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            Wallet::from_private_key("not-hex"),
            Err(CreError::Config(_))
        ));
        assert!(Wallet::from_private_key(&"00".repeat(32)).is_err());
    }
}
