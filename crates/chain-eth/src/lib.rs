//! Ethereum chain support for the wallet core.
//!
//! This crate provides:
//! - address derivation from secp256k1 keys (lowercase canonical form, EIP-55
//!   for display) and address validation
//! - EIP-1559 native value transfers: building, signing, RLP encoding
//! - JSON-RPC request/response shapes for balance, nonce, fees and broadcast

pub mod address;
pub mod error;
pub mod rpc;
pub mod transaction;

pub use address::{address_from_private_key, checksum_address, pubkey_to_eth_address, validate_address};
pub use error::EthError;
pub use transaction::{
    build_transfer, encode_unsigned_tx, max_fee_for_base_fee, sign_transaction, EthTransaction,
    SignedEthTransaction, ETH_DECIMALS, TRANSFER_GAS_LIMIT,
};
