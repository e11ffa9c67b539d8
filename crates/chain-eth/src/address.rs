use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::error::EthError;

/// Derives the canonical lowercase Ethereum address from an uncompressed
/// secp256k1 public key (65 bytes, starting with 0x04).
///
/// Keccak-256 of the 64-byte key without the 0x04 prefix; the last 20 bytes
/// are the address.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    Ok(format!("0x{}", hex::encode(&hash[12..])))
}

/// Uncompressed public key for a 32-byte private scalar.
pub fn uncompressed_pubkey(private_key: &[u8; 32]) -> Result<[u8; 65], EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    key_bytes.zeroize();

    signing_key
        .verifying_key()
        .to_encoded_point(false)
        .as_bytes()
        .try_into()
        .map_err(|_| EthError::InvalidPublicKey("unexpected uncompressed key length".into()))
}

/// Lowercase address for a 32-byte private scalar.
pub fn address_from_private_key(private_key: &[u8; 32]) -> Result<String, EthError> {
    pubkey_to_eth_address(&uncompressed_pubkey(private_key)?)
}

/// Validates an Ethereum address string.
///
/// Requires `0x` followed by exactly 40 hex characters. All-lowercase and
/// all-uppercase forms carry no checksum; mixed case must match EIP-55.
pub fn validate_address(address: &str) -> Result<(), EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(());
    }

    if checksum_address(address)? != address {
        return Err(EthError::InvalidAddress("EIP-55 checksum mismatch".into()));
    }
    Ok(())
}

/// Parses a validated address into its 20 raw bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 20], EthError> {
    validate_address(address)?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(&address[2..], &mut out)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
    Ok(out)
}

/// Applies EIP-55 mixed-case checksum encoding to an address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?
        .to_lowercase();

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {:?}",
            hex_part
        )));
    }

    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in hex_part.chars().enumerate() {
        // Nibble i of the hash: high nibble for even i, low nibble for odd.
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}
