use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::rpc;
use rust_decimal::Decimal;

use super::{ChainStrategy, SignedTransfer};
use crate::address;
use crate::error::WalletError;
use crate::rpc::RpcTransport;
use crate::types::{Account, ChainTag};
use crate::units::from_smallest_unit;

/// Ed25519 keys, base58 addresses, System Program transfers.
pub struct SolanaStrategy {
    transport: Arc<dyn RpcTransport>,
}

impl SolanaStrategy {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ChainStrategy for SolanaStrategy {
    fn chain(&self) -> ChainTag {
        ChainTag::Solana
    }

    fn derive_account(&self, seed: &[u8], index: u32) -> Result<Account, WalletError> {
        address::derive_account(seed, ChainTag::Solana, index)
    }

    fn validate_address(&self, address: &str) -> Result<(), WalletError> {
        address::validate_address(address, ChainTag::Solana)
    }

    async fn fetch_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        let result = self
            .transport
            .call(rpc::GET_BALANCE, rpc::get_balance_params(address))
            .await?;
        let lamports = rpc::parse_balance(&result)?;
        from_smallest_unit(lamports as u128, ChainTag::Solana)
    }

    async fn build_transfer(
        &self,
        sender: &Account,
        to: &str,
        amount: u128,
    ) -> Result<SignedTransfer, WalletError> {
        let lamports = u64::try_from(amount)
            .map_err(|_| WalletError::InvalidAmount(format!("{amount} lamports exceeds u64")))?;
        let to_pubkey = chain_sol::address_to_bytes(to)?;
        let from_pubkey = chain_sol::pubkey_from_private_key(sender.private_key.expose());

        let result = self
            .transport
            .call(rpc::GET_LATEST_BLOCKHASH, rpc::get_latest_blockhash_params())
            .await?;
        let blockhash = rpc::parse_latest_blockhash(&result)?;

        let tx = chain_sol::build_sol_transfer(&from_pubkey, &to_pubkey, lamports, &blockhash)?;
        let signed = chain_sol::sign_transaction(&tx, sender.private_key.expose())?;

        Ok(SignedTransfer {
            local_tx_id: signed.signature_base58(),
            payload: signed.wire,
        })
    }

    async fn submit(&self, transfer: &SignedTransfer) -> Result<String, WalletError> {
        let result = self
            .transport
            .call(
                rpc::SEND_TRANSACTION,
                rpc::send_transaction_params(&transfer.payload),
            )
            .await?;
        Ok(rpc::parse_signature(&result)?)
    }
}
