use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_private_key() {
        let err = SolError::InvalidPrivateKey("key too short".into());
        assert_eq!(err.to_string(), "invalid private key: key too short");
    }

    #[test]
    fn display_invalid_address() {
        let err = SolError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_transaction_build_error() {
        let err = SolError::TransactionBuildError("lamports must be > 0".into());
        assert_eq!(
            err.to_string(),
            "transaction build error: lamports must be > 0"
        );
    }

    #[test]
    fn display_serialization_error() {
        let err = SolError::SerializationError("too many accounts".into());
        assert_eq!(err.to_string(), "serialization error: too many accounts");
    }

    #[test]
    fn display_malformed_response() {
        let err = SolError::MalformedResponse("missing value".into());
        assert_eq!(err.to_string(), "malformed rpc response: missing value");
    }

    #[test]
    fn debug_format_works() {
        let err = SolError::MalformedResponse("fail".into());
        assert!(format!("{err:?}").contains("MalformedResponse"));
    }
}
