use rand_core::{OsRng, RngCore};

use crate::error::CryptoError;

/// Fills `buf` from the operating system CSPRNG.
///
/// No fallback source: if the OS cannot provide entropy the caller gets
/// `EntropyUnavailable`.
pub fn fill_secure(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))
}

/// Returns a fixed-size array of cryptographically secure random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    fill_secure(&mut buf)?;
    Ok(buf)
}
