//! Per-chain behaviour behind one trait, selected by [`ChainTag`].

mod ethereum;
mod solana;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::ChainConfig;
use crate::error::WalletError;
use crate::rpc::RpcTransport;
use crate::types::{Account, ChainTag};

pub use ethereum::EthereumStrategy;
pub use solana::SolanaStrategy;

/// A signed transaction ready to broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    /// Wire bytes as the node expects them.
    pub payload: Vec<u8>,
    /// Identifier computed locally while signing.
    pub local_tx_id: String,
}

#[async_trait]
pub trait ChainStrategy: Send + Sync {
    fn chain(&self) -> ChainTag;

    /// Derive account `index` from a 64-byte seed. Pure.
    fn derive_account(&self, seed: &[u8], index: u32) -> Result<Account, WalletError>;

    /// Syntax check for a destination address. Never touches the network.
    fn validate_address(&self, address: &str) -> Result<(), WalletError>;

    /// Balance in display units. Exactly one RPC request.
    async fn fetch_balance(&self, address: &str) -> Result<Decimal, WalletError>;

    /// Fetch whatever the chain needs (blockhash, nonce, fees), then build
    /// and sign a native transfer of `amount` smallest units.
    async fn build_transfer(
        &self,
        sender: &Account,
        to: &str,
        amount: u128,
    ) -> Result<SignedTransfer, WalletError>;

    /// Broadcast and return the node's transaction identifier.
    async fn submit(&self, transfer: &SignedTransfer) -> Result<String, WalletError>;
}

/// Strategy for `chain` talking to its node through `transport`.
pub fn strategy_for(
    chain: ChainTag,
    config: &ChainConfig,
    transport: Arc<dyn RpcTransport>,
) -> Arc<dyn ChainStrategy> {
    match chain {
        ChainTag::Solana => Arc::new(SolanaStrategy::new(transport)),
        ChainTag::Ethereum => Arc::new(EthereumStrategy::new(
            config.chain_id_or_default(),
            transport,
        )),
    }
}
