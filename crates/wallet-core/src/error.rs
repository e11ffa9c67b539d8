use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: String, available: String },

    #[error("Balance unavailable: {0}")]
    BalanceUnavailable(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("RPC rejected (code {code}): {message}")]
    RpcRejected { code: i64, message: String },

    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Transaction build failed: {0}")]
    TransactionFailed(String),

    #[error("Account not found: {0}")]
    AccountNotFound(u32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crypto_utils::CryptoError> for WalletError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::EntropyUnavailable(msg) => WalletError::EntropyUnavailable(msg),
            other => WalletError::DerivationFailed(other.to_string()),
        }
    }
}

impl From<chain_eth::EthError> for WalletError {
    fn from(e: chain_eth::EthError) -> Self {
        use chain_eth::EthError;
        match e {
            EthError::InvalidAddress(msg) => WalletError::InvalidAddress(msg),
            EthError::InvalidPrivateKey(msg) | EthError::InvalidPublicKey(msg) => {
                WalletError::DerivationFailed(format!("ETH: {msg}"))
            }
            EthError::SigningError(msg) => WalletError::SigningFailed(format!("ETH: {msg}")),
            EthError::MalformedResponse(msg) => WalletError::NetworkFailure(format!("ETH: {msg}")),
            EthError::TransactionBuildError(msg) => {
                WalletError::TransactionFailed(format!("ETH: {msg}"))
            }
        }
    }
}

impl From<chain_sol::SolError> for WalletError {
    fn from(e: chain_sol::SolError) -> Self {
        use chain_sol::SolError;
        match e {
            SolError::InvalidAddress(msg) => WalletError::InvalidAddress(msg),
            SolError::InvalidPrivateKey(msg) => WalletError::SigningFailed(format!("SOL: {msg}")),
            SolError::MalformedResponse(msg) => WalletError::NetworkFailure(format!("SOL: {msg}")),
            SolError::TransactionBuildError(msg) | SolError::SerializationError(msg) => {
                WalletError::TransactionFailed(format!("SOL: {msg}"))
            }
        }
    }
}
