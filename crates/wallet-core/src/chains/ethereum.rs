use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::rpc;
use rust_decimal::Decimal;

use super::{ChainStrategy, SignedTransfer};
use crate::address;
use crate::error::WalletError;
use crate::rpc::RpcTransport;
use crate::types::{Account, ChainTag};
use crate::units::from_smallest_unit;

/// secp256k1 keys, Keccak addresses, EIP-1559 value transfers.
pub struct EthereumStrategy {
    chain_id: u64,
    transport: Arc<dyn RpcTransport>,
}

impl EthereumStrategy {
    pub fn new(chain_id: u64, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            chain_id,
            transport,
        }
    }

    /// `(max_priority_fee_per_gas, max_fee_per_gas)` for the next transfer.
    ///
    /// The fee cap is `2 * baseFeePerGas + tip` from the latest block. A node
    /// whose blocks carry no base fee gets `eth_gasPrice` as the cap.
    async fn fees(&self) -> Result<(u128, u128), WalletError> {
        let block = self
            .transport
            .call(rpc::GET_BLOCK_BY_NUMBER, rpc::latest_block_params())
            .await?;
        let base_fee = rpc::parse_base_fee(&block)?;
        let priority_fee = self
            .quantity(rpc::MAX_PRIORITY_FEE_PER_GAS, rpc::no_params())
            .await?;

        let max_fee = match base_fee {
            Some(base_fee) => chain_eth::max_fee_for_base_fee(base_fee, priority_fee).ok_or_else(
                || WalletError::TransactionFailed(format!("fee cap overflows for base fee {base_fee}")),
            )?,
            None => self.quantity(rpc::GAS_PRICE, rpc::no_params()).await?,
        };

        Ok((priority_fee, max_fee))
    }

    async fn quantity(&self, method: &str, params: serde_json::Value) -> Result<u128, WalletError> {
        let result = self.transport.call(method, params).await?;
        Ok(rpc::parse_quantity(&result)?)
    }
}

#[async_trait]
impl ChainStrategy for EthereumStrategy {
    fn chain(&self) -> ChainTag {
        ChainTag::Ethereum
    }

    fn derive_account(&self, seed: &[u8], index: u32) -> Result<Account, WalletError> {
        address::derive_account(seed, ChainTag::Ethereum, index)
    }

    fn validate_address(&self, address: &str) -> Result<(), WalletError> {
        address::validate_address(address, ChainTag::Ethereum)
    }

    async fn fetch_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        let wei = self
            .quantity(rpc::GET_BALANCE, rpc::get_balance_params(address))
            .await?;
        from_smallest_unit(wei, ChainTag::Ethereum)
    }

    async fn build_transfer(
        &self,
        sender: &Account,
        to: &str,
        amount: u128,
    ) -> Result<SignedTransfer, WalletError> {
        let from = rpc::checked_address(&sender.address)?;

        let nonce_result = self
            .transport
            .call(
                rpc::GET_TRANSACTION_COUNT,
                rpc::get_transaction_count_params(from),
            )
            .await?;
        let nonce = rpc::parse_nonce(&nonce_result)?;
        let (priority_fee, max_fee) = self.fees().await?;

        let tx = chain_eth::build_transfer(
            self.chain_id,
            nonce,
            to,
            amount,
            priority_fee,
            max_fee,
            chain_eth::TRANSFER_GAS_LIMIT,
        )?;
        let signed = chain_eth::sign_transaction(&tx, sender.private_key.expose())?;

        Ok(SignedTransfer {
            payload: signed.raw_tx,
            local_tx_id: signed.tx_hash,
        })
    }

    async fn submit(&self, transfer: &SignedTransfer) -> Result<String, WalletError> {
        let result = self
            .transport
            .call(
                rpc::SEND_RAW_TRANSACTION,
                rpc::send_raw_transaction_params(&transfer.payload),
            )
            .await?;
        Ok(rpc::parse_tx_hash(&result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;
    use crate::rpc::MockTransport;
    use serde_json::json;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const SENDER: &str = "0x1cc31e180cca3a8698fd6f13765209ec7cb9e755";
    const DEST: &str = "0x3590821f4fd8b921b74d923475b7da6c9b2ae83b";

    fn strategy() -> (Arc<MockTransport>, EthereumStrategy) {
        let mock = Arc::new(MockTransport::new());
        (mock.clone(), EthereumStrategy::new(1, mock))
    }

    fn sender() -> Account {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        address::derive_account(&seed, ChainTag::Ethereum, 0).unwrap()
    }

    const GWEI: u128 = 1_000_000_000;

    // nonce 5, base fee 20 gwei, tip 1 gwei, gas price 50 gwei
    fn script_fees(mock: &MockTransport) {
        mock.respond("eth_getTransactionCount", json!("0x5"))
            .respond(
                "eth_getBlockByNumber",
                json!({"number": "0x10", "baseFeePerGas": "0x4a817c800"}),
            )
            .respond("eth_gasPrice", json!("0xba43b7400"))
            .respond("eth_maxPriorityFeePerGas", json!("0x3b9aca00"));
    }

    fn expected_payload(max_fee: u128) -> Vec<u8> {
        let tx = chain_eth::build_transfer(
            1,
            5,
            DEST,
            1_000,
            GWEI,
            max_fee,
            chain_eth::TRANSFER_GAS_LIMIT,
        )
        .unwrap();
        chain_eth::sign_transaction(&tx, sender().private_key.expose())
            .unwrap()
            .raw_tx
    }

    #[tokio::test]
    async fn balance_in_eth() {
        let (mock, strategy) = strategy();
        mock.respond("eth_getBalance", json!("0x1bc16d674ec80000"));

        let balance = strategy.fetch_balance(SENDER).await.unwrap();
        assert_eq!(balance, Decimal::new(2, 0));
        assert_eq!(mock.calls_to("eth_getBalance"), vec![json!([SENDER, "latest"])]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_balance_is_zero() {
        let (mock, strategy) = strategy();
        mock.respond("eth_getBalance", json!("0x0"));
        assert_eq!(strategy.fetch_balance(SENDER).await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn build_fetches_nonce_and_fees() {
        let (mock, strategy) = strategy();
        script_fees(&mock);

        let signed = strategy.build_transfer(&sender(), DEST, 1_000).await.unwrap();
        assert_eq!(signed.payload[0], 0x02);
        assert!(signed.local_tx_id.starts_with("0x"));
        assert_eq!(
            mock.methods_called(),
            vec![
                "eth_getTransactionCount",
                "eth_getBlockByNumber",
                "eth_maxPriorityFeePerGas"
            ]
        );
        assert_eq!(
            mock.calls_to("eth_getBlockByNumber"),
            vec![json!(["latest", false])]
        );
        assert_eq!(
            mock.calls_to("eth_getTransactionCount"),
            vec![json!([SENDER, "pending"])]
        );
    }

    #[tokio::test]
    async fn fee_cap_is_twice_base_fee_plus_tip() {
        let (mock, strategy) = strategy();
        script_fees(&mock);

        let signed = strategy.build_transfer(&sender(), DEST, 1_000).await.unwrap();
        assert_eq!(signed.payload, expected_payload(2 * 20 * GWEI + GWEI));

        // 0x02, list header, chain id 1, nonce 5, tip, fee cap
        assert_eq!(
            &signed.payload[3..15],
            &[0x01, 0x05, 0x84, 0x3b, 0x9a, 0xca, 0x00, 0x85, 0x09, 0x8b, 0xca, 0x5a][..]
        );
        assert_eq!(signed.payload[15], 0x00);
    }

    #[tokio::test]
    async fn block_without_base_fee_uses_gas_price() {
        let (mock, strategy) = strategy();
        script_fees(&mock);
        mock.respond("eth_getBlockByNumber", json!({"number": "0x10"}));

        let signed = strategy.build_transfer(&sender(), DEST, 1_000).await.unwrap();
        assert_eq!(signed.payload, expected_payload(50 * GWEI));
        assert_eq!(mock.calls_to("eth_gasPrice").len(), 1);
    }

    #[tokio::test]
    async fn rejected_fee_query_propagates() {
        let (mock, strategy) = strategy();
        mock.respond("eth_getTransactionCount", json!("0x0"))
            .reject("eth_getBlockByNumber", -32601, "method not found");

        let err = strategy.build_transfer(&sender(), DEST, 1).await.unwrap_err();
        assert!(matches!(err, WalletError::RpcRejected { code: -32601, .. }));
    }

    #[tokio::test]
    async fn submit_sends_raw_hex() {
        let (mock, strategy) = strategy();
        let hash = format!("0x{}", "ab".repeat(32));
        mock.respond("eth_sendRawTransaction", json!(hash));

        let transfer = SignedTransfer {
            payload: vec![0x02, 0xc0],
            local_tx_id: String::new(),
        };
        assert_eq!(strategy.submit(&transfer).await.unwrap(), hash);
        assert_eq!(mock.calls_to("eth_sendRawTransaction"), vec![json!(["0x02c0"])]);
    }
}
