use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}
