//! Ethereum personal-message signatures

use crate::{CreError, Result};
use ethereum_types::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey};
use secp256k1::{Message, SecretKey, SECP256K1};

/// Prefix applied to messages before hashing (EIP-191 version 0x45)
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Offset added to the recovery id in the trailing `v` byte
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Hash a message the way wallets do for `personal_sign`
pub fn hash_personal_message(message: &[u8]) -> H256 {
    let mut prefixed = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    prefixed.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    prefixed.extend_from_slice(message.len().to_string().as_bytes());
    prefixed.extend_from_slice(message);
    H256::from(keccak256(&prefixed))
}

/// Sign a message with the personal-message prefix, returning `r ‖ s ‖ v`
pub fn sign_personal_message(message: &[u8], secret_key: &SecretKey) -> Result<[u8; 65]> {
    let hash = hash_personal_message(message);
    let message = Message::from_digest_slice(hash.as_bytes())
        .map_err(|_| CreError::signing("Invalid message hash"))?;

    let signature = SECP256K1.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut sig_bytes = [0u8; 65];
    sig_bytes[0..64].copy_from_slice(&compact);
    sig_bytes[64] = recovery_id.to_i32() as u8 + RECOVERY_ID_OFFSET;
    Ok(sig_bytes)
}

/// Recover the address that produced a 65-byte personal-message signature
pub fn recover_personal_signer(message: &[u8], signature: &[u8]) -> Result<Address> {
    if signature.len() != 65 {
        return Err(CreError::invalid_signature("Signature must be 65 bytes"));
    }

    let v = signature[64];
    let recovery_id = match v {
        0 | 1 => v,
        27 | 28 => v - RECOVERY_ID_OFFSET,
        _ => return Err(CreError::invalid_signature("Invalid recovery ID")),
    };

    recover_with_id(message, &signature[..64], recovery_id)
}

/// Recover the signer of an `r ‖ s` signature using an explicit recovery id
pub fn recover_with_id(message: &[u8], rs: &[u8], recovery_id: u8) -> Result<Address> {
    let recovery_id = RecoveryId::try_from(recovery_id)
        .map_err(|_| CreError::invalid_signature("Invalid recovery ID"))?;

    let k256_sig = K256Signature::try_from(rs)
        .map_err(|_| CreError::invalid_signature("Invalid signature format"))?;

    let hash = hash_personal_message(message);
    let verifying_key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|_| CreError::invalid_signature("Failed to recover public key"))?;

    ethereum_address_from_pubkey(&verifying_key)
}

/// Convert a public key to an Ethereum address
pub fn ethereum_address_from_pubkey(pubkey: &VerifyingKey) -> Result<Address> {
    let point = pubkey.to_encoded_point(false);
    address_from_uncompressed(point.as_bytes())
}

/// Derive the address of a secp256k1 secret key
pub fn address_from_secret_key(secret_key: &SecretKey) -> Result<Address> {
    let public_key = secp256k1::PublicKey::from_secret_key_global(secret_key);
    address_from_uncompressed(&public_key.serialize_uncompressed())
}

fn address_from_uncompressed(pubkey_bytes: &[u8]) -> Result<Address> {
    if pubkey_bytes.len() != 65 {
        return Err(CreError::invalid_signature("Invalid public key length"));
    }

    // Skip the 0x04 tag; the address is the last 20 bytes of the hash
    let pubkey_hash = keccak256(&pubkey_bytes[1..]);
    Ok(Address::from_slice(&pubkey_hash[12..]))
}

/// Render an address with the EIP-55 mixed-case checksum
pub fn to_checksum_address(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Parse a hex address, ignoring checksum casing
pub fn parse_address(address: &str) -> Result<Address> {
    let bytes = hex::decode(address.trim_start_matches("0x"))
        .map_err(|_| CreError::invalid_signature(format!("Invalid address: {}", address)))?;
    if bytes.len() != 20 {
        return Err(CreError::invalid_signature(format!(
            "Invalid address length: {}",
            address
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// Parse a hex private key, with or without the `0x` prefix
pub fn parse_secret_key(private_key: &str) -> Result<SecretKey> {
    let private_key_bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
        .map_err(|_| CreError::config("Invalid hex private key"))?;

    SecretKey::from_slice(&private_key_bytes).map_err(|_| CreError::config("Invalid private key"))
}

/// Keccak-256 hash function
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    use sha3::{Digest, Keccak256};
    Keccak256::digest(data).into()
}
