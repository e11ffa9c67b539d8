//! # wallet-core
//!
//! One BIP-39 mnemonic, any number of accounts on two chains: Solana
//! (SLIP-0010 Ed25519, base58 addresses) and Ethereum (BIP-32 secp256k1,
//! Keccak-256 addresses). Each chain wallet derives accounts, caches
//! balances fetched over JSON-RPC and submits signed native transfers.
//!
//! The async API on [`ChainWallet`] and [`Wallet`] is the boundary a UI
//! calls into; nothing here renders or persists anything.

pub mod address;
pub mod chains;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod logging;
pub mod mnemonic;
pub mod registry;
pub mod rpc;
pub mod types;
pub mod units;
pub mod wallet;

pub use chains::{ChainStrategy, EthereumStrategy, SignedTransfer, SolanaStrategy};
pub use config::{ChainConfig, WalletConfig};
pub use error::WalletError;
pub use mnemonic::{generate_mnemonic, is_valid_word, validate_mnemonic, word_list, ZeroizingMnemonic};
pub use registry::AccountRegistry;
pub use rpc::{HttpTransport, RpcTransport};
#[cfg(any(test, feature = "test-util"))]
pub use rpc::{MockReply, MockTransport};
pub use types::{
    Account, Balance, ChainTag, CurveType, TransferRecord, TransferRequest, TransferResult,
    TransferStatus,
};
pub use wallet::{ChainWallet, Wallet};
