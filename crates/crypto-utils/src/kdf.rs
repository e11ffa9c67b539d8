use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::CryptoError;

type HmacSha512 = Hmac<Sha512>;

/// Computes HMAC-SHA512 over the concatenation of `parts`.
///
/// This is the primitive behind both the BIP-32 and SLIP-0010 tree walks:
/// the left 32 bytes of the output become the child key, the right 32 bytes
/// the child chain code.
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64], CryptoError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| CryptoError::KdfFailed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Splits a 64-byte HMAC output into `(key, chain_code)`.
pub fn split_key_and_chain_code(output: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&output[..32]);
    chain_code.copy_from_slice(&output[32..]);
    (key, chain_code)
}
