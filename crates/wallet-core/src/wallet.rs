//! Per-chain account management and the two-chain facade.

use std::sync::Arc;

use chrono::Utc;
use crypto_utils::ZeroizingString;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chains::{strategy_for, ChainStrategy};
use crate::config::{ChainConfig, WalletConfig};
use crate::error::WalletError;
use crate::mnemonic::{self, ZeroizingMnemonic};
use crate::registry::AccountRegistry;
use crate::rpc::{HttpTransport, RpcTransport};
use crate::types::{
    Account, Balance, ChainTag, TransferRecord, TransferRequest, TransferResult, TransferStatus,
};
use crate::units::to_smallest_unit;

/// Accounts, node connection and transfer history for one chain.
pub struct ChainWallet {
    chain: ChainTag,
    config: ChainConfig,
    strategy: Arc<dyn ChainStrategy>,
    registry: AccountRegistry,
    /// Serializes `add_account` so indices are handed out exactly once.
    derive_lock: Mutex<()>,
    history: RwLock<Vec<TransferRecord>>,
}

impl ChainWallet {
    /// Wallet talking JSON-RPC over HTTP to `config.rpc_url`.
    pub fn new(chain: ChainTag, config: ChainConfig) -> Result<Self, WalletError> {
        config.validate(chain)?;
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(chain, config, transport)
    }

    /// Wallet using a caller-supplied transport.
    pub fn with_transport(
        chain: ChainTag,
        config: ChainConfig,
        transport: Arc<dyn RpcTransport>,
    ) -> Result<Self, WalletError> {
        config.validate(chain)?;
        let strategy = strategy_for(chain, &config, transport);
        Ok(Self {
            chain,
            config,
            strategy,
            registry: AccountRegistry::new(chain),
            derive_lock: Mutex::new(()),
            history: RwLock::new(Vec::new()),
        })
    }

    pub fn chain(&self) -> ChainTag {
        self.chain
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Derive and register the next account.
    ///
    /// The seed is stretched on the blocking pool. Concurrent calls are
    /// serialized, so each gets a distinct index `len()` at the time it runs.
    /// No RPC is made: the new account's balance is `Unknown` until
    /// [`refresh_balance`](Self::refresh_balance) runs.
    pub async fn add_account(&self, mnemonic: &str, passphrase: &str) -> Result<Account, WalletError> {
        let phrase = ZeroizingString::from(mnemonic);
        let passphrase = ZeroizingString::from(passphrase);

        let _guard = self.derive_lock.lock().await;
        let index = u32::try_from(self.registry.len())
            .map_err(|_| WalletError::DerivationFailed("account index overflow".into()))?;

        let seed = tokio::task::spawn_blocking(move || {
            mnemonic::mnemonic_to_seed(&phrase, &passphrase)
        })
        .await
        .map_err(|e| WalletError::DerivationFailed(format!("seed task failed: {e}")))??;

        let account = self.strategy.derive_account(&seed, index)?;
        self.registry.append(account.clone())?;

        info!(
            chain = %self.chain,
            index,
            path = %account.derivation_path,
            address = %account.address,
            "account added"
        );
        Ok(account)
    }

    /// `add_account` followed by one balance refresh.
    ///
    /// A failed refresh does not undo the add: the account is returned with
    /// an `Unknown` balance.
    pub async fn add_account_with_balance(
        &self,
        mnemonic: &str,
        passphrase: &str,
    ) -> Result<Account, WalletError> {
        let account = self.add_account(mnemonic, passphrase).await?;
        if let Err(e) = self.refresh_balance(account.index).await {
            debug!(chain = %self.chain, index = account.index, error = %e, "initial balance unavailable");
        }
        self.registry.get(account.index)
    }

    /// Query the node for one account's balance and cache it.
    ///
    /// On any failure the cached balance becomes `Unknown` and the error is
    /// `BalanceUnavailable` with the underlying message. A result that lands
    /// after a transfer marked the account stale is returned but not cached.
    pub async fn refresh_balance(&self, index: u32) -> Result<Decimal, WalletError> {
        let account = self.registry.get(index)?;
        let epoch = self.registry.balance_epoch(index)?;

        match self.strategy.fetch_balance(&account.address).await {
            Ok(balance) => {
                if self
                    .registry
                    .update_balance_if_current(index, epoch, Balance::Known(balance))?
                {
                    debug!(chain = %self.chain, index, %balance, "balance refreshed");
                } else {
                    debug!(chain = %self.chain, index, %balance, "balance outdated by a transfer, not cached");
                }
                Ok(balance)
            }
            Err(e) => {
                self.registry
                    .update_balance_if_current(index, epoch, Balance::Unknown)?;
                warn!(chain = %self.chain, index, error = %e, "balance refresh failed");
                Err(WalletError::BalanceUnavailable(failure_reason(&e)))
            }
        }
    }

    /// Validate, build, sign and submit a native transfer.
    ///
    /// Local problems (bad address, bad amount, insufficient or unknown
    /// balance, unknown sender) are returned as errors before any network
    /// call. Once the node is involved, every failure comes back as a
    /// `Failed` result carrying the raw message.
    pub async fn send_transfer(&self, request: TransferRequest) -> Result<TransferResult, WalletError> {
        if request.chain != self.chain {
            return Err(WalletError::TransactionFailed(format!(
                "{} transfer sent to the {} wallet",
                request.chain, self.chain
            )));
        }

        let sender = self.registry.get(request.sender_index)?;
        self.strategy.validate_address(&request.to)?;
        let amount = to_smallest_unit(request.amount, self.chain)?;

        match sender.balance {
            Balance::Unknown => {
                return Err(WalletError::BalanceUnavailable(format!(
                    "balance of account {} is unknown; refresh it first",
                    sender.index
                )));
            }
            Balance::Known(available) if request.amount > available => {
                return Err(WalletError::InsufficientFunds {
                    requested: request.amount.to_string(),
                    available: available.to_string(),
                });
            }
            Balance::Known(_) => {}
        }

        let record_id = self.record_pending(&sender, &request);

        let outcome = match self.strategy.build_transfer(&sender, &request.to, amount).await {
            Ok(signed) => {
                debug!(chain = %self.chain, local_tx_id = %signed.local_tx_id, "transfer signed");
                self.strategy.submit(&signed).await
            }
            Err(e) => Err(e),
        };

        let result = match outcome {
            Ok(tx_id) => {
                self.registry.mark_stale(sender.index)?;
                info!(
                    chain = %self.chain,
                    index = sender.index,
                    to = %request.to,
                    amount = %request.amount,
                    tx_id = %tx_id,
                    "transfer submitted"
                );
                TransferResult::submitted(tx_id)
            }
            Err(e) => {
                warn!(
                    chain = %self.chain,
                    index = sender.index,
                    to = %request.to,
                    error = %e,
                    "transfer failed"
                );
                TransferResult::failed(failure_reason(&e))
            }
        };

        self.finish_record(record_id, &result);
        Ok(result)
    }

    /// All accounts in derivation order.
    pub fn accounts(&self) -> Vec<Account> {
        self.registry.all()
    }

    pub fn account(&self, index: u32) -> Result<Account, WalletError> {
        self.registry.get(index)
    }

    /// Up to `limit` transfers, most recent first.
    pub fn recent_transfers(&self, limit: usize) -> Vec<TransferRecord> {
        self.history.read().iter().rev().take(limit).cloned().collect()
    }

    /// Explorer link for a transaction id on this chain.
    pub fn explorer_tx_url(&self, tx_id: &str) -> String {
        self.config.explorer_tx_url(tx_id)
    }

    fn record_pending(&self, sender: &Account, request: &TransferRequest) -> usize {
        let mut history = self.history.write();
        history.push(TransferRecord {
            sender_index: sender.index,
            from: sender.address.clone(),
            to: request.to.clone(),
            amount: request.amount,
            status: TransferStatus::Pending,
            tx_id: None,
            reason: None,
            created_at: Utc::now(),
        });
        history.len() - 1
    }

    fn finish_record(&self, record_id: usize, result: &TransferResult) {
        if let Some(record) = self.history.write().get_mut(record_id) {
            record.status = result.status;
            record.tx_id = result.tx_id.clone();
            record.reason = result.reason.clone();
        }
    }
}

/// The node's own message where there is one.
fn failure_reason(error: &WalletError) -> String {
    match error {
        WalletError::RpcRejected { message, .. } => message.clone(),
        WalletError::NetworkFailure(message) => message.clone(),
        other => other.to_string(),
    }
}

/// One mnemonic, one wallet per chain.
pub struct Wallet {
    mnemonic: ZeroizingMnemonic,
    passphrase: SecretString,
    solana: ChainWallet,
    ethereum: ChainWallet,
}

impl Wallet {
    /// New wallet with a freshly generated 12-word mnemonic.
    pub fn generate(config: WalletConfig) -> Result<Self, WalletError> {
        let mnemonic = mnemonic::generate_mnemonic()?;
        Self::build(mnemonic, "", config, None)
    }

    /// Restore from an existing mnemonic and optional passphrase.
    pub fn from_mnemonic(phrase: &str, passphrase: &str, config: WalletConfig) -> Result<Self, WalletError> {
        let mnemonic = ZeroizingMnemonic::new(phrase)?;
        Self::build(mnemonic, passphrase, config, None)
    }

    /// Restore with explicit transports, e.g. mock nodes.
    pub fn with_transports(
        phrase: &str,
        passphrase: &str,
        config: WalletConfig,
        solana: Arc<dyn RpcTransport>,
        ethereum: Arc<dyn RpcTransport>,
    ) -> Result<Self, WalletError> {
        let mnemonic = ZeroizingMnemonic::new(phrase)?;
        Self::build(mnemonic, passphrase, config, Some((solana, ethereum)))
    }

    fn build(
        mnemonic: ZeroizingMnemonic,
        passphrase: &str,
        config: WalletConfig,
        transports: Option<(Arc<dyn RpcTransport>, Arc<dyn RpcTransport>)>,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        let WalletConfig { solana, ethereum } = config;

        let (solana, ethereum) = match transports {
            Some((sol_transport, eth_transport)) => (
                ChainWallet::with_transport(ChainTag::Solana, solana, sol_transport)?,
                ChainWallet::with_transport(ChainTag::Ethereum, ethereum, eth_transport)?,
            ),
            None => (
                ChainWallet::new(ChainTag::Solana, solana)?,
                ChainWallet::new(ChainTag::Ethereum, ethereum)?,
            ),
        };

        Ok(Self {
            mnemonic,
            passphrase: SecretString::from(passphrase.to_string()),
            solana,
            ethereum,
        })
    }

    /// The backup phrase, for display to the user.
    pub fn mnemonic(&self) -> &str {
        self.mnemonic.as_str()
    }

    pub fn chain(&self, chain: ChainTag) -> &ChainWallet {
        match chain {
            ChainTag::Solana => &self.solana,
            ChainTag::Ethereum => &self.ethereum,
        }
    }

    pub async fn add_account(&self, chain: ChainTag) -> Result<Account, WalletError> {
        self.chain(chain)
            .add_account(self.mnemonic.as_str(), self.passphrase.expose_secret())
            .await
    }

    /// Add an account and try once to fetch its balance.
    pub async fn add_account_with_balance(&self, chain: ChainTag) -> Result<Account, WalletError> {
        self.chain(chain)
            .add_account_with_balance(self.mnemonic.as_str(), self.passphrase.expose_secret())
            .await
    }

    pub async fn refresh_balance(&self, chain: ChainTag, index: u32) -> Result<Decimal, WalletError> {
        self.chain(chain).refresh_balance(index).await
    }

    pub async fn send_transfer(&self, request: TransferRequest) -> Result<TransferResult, WalletError> {
        self.chain(request.chain).send_transfer(request).await
    }

    pub fn accounts(&self, chain: ChainTag) -> Vec<Account> {
        self.chain(chain).accounts()
    }

    pub fn recent_transfers(&self, chain: ChainTag, limit: usize) -> Vec<TransferRecord> {
        self.chain(chain).recent_transfers(limit)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("solana_accounts", &self.solana.registry.len())
            .field("ethereum_accounts", &self.ethereum.registry.len())
            .finish_non_exhaustive()
    }
}
