//! Solana address derivation and validation.
//!
//! A Solana address is the Base58 encoding of the raw 32-byte Ed25519 public
//! key. There is no hashing step, unlike Ethereum.

use zeroize::Zeroize;

use crate::error::SolError;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Shortest and longest textual forms a 32-byte key can take in Base58.
pub const MIN_ADDRESS_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 44;

/// Convert a 32-byte Ed25519 public key to a Solana address string.
pub fn keypair_to_address(ed25519_pubkey: &[u8; 32]) -> String {
    bs58::encode(ed25519_pubkey).into_string()
}

/// Derive the Ed25519 public key for a 32-byte private key (the RFC 8032 seed).
pub fn pubkey_from_private_key(private_key: &[u8; 32]) -> [u8; 32] {
    let mut secret = *private_key;
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
    secret.zeroize();
    signing_key.verifying_key().to_bytes()
}

/// The 64-byte `secret || public` keypair form used by Solana tooling for
/// key export. Caller owns the returned secret material.
pub fn keypair_bytes(private_key: &[u8; 32]) -> [u8; 64] {
    let mut secret = *private_key;
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
    secret.zeroize();
    signing_key.to_keypair_bytes()
}

/// Validate a Solana address string.
///
/// The string must be 32–44 characters from the Base58 alphabet and decode
/// to exactly 32 bytes. The alphabet check runs first so that characters like
/// `0`, `O`, `I` and `l` are reported as such rather than as a decode failure.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    if address.len() < MIN_ADDRESS_LEN || address.len() > MAX_ADDRESS_LEN {
        return Err(SolError::InvalidAddress(format!(
            "expected {MIN_ADDRESS_LEN}-{MAX_ADDRESS_LEN} characters, got {}",
            address.len()
        )));
    }

    if let Some(bad) = address.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(SolError::InvalidAddress(format!(
            "character {bad:?} is not in the base58 alphabet"
        )));
    }

    address_to_bytes(address).map(|_| ())
}

/// Decode a Solana address string to its 32-byte representation.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}
