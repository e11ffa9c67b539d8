//! RPC endpoint configuration, injected into each chain wallet.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::types::ChainTag;

pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_ETHEREUM_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";
pub const DEFAULT_SOLANA_EXPLORER_URL: &str = "https://explorer.solana.com/tx/";
pub const DEFAULT_ETHEREUM_EXPLORER_URL: &str = "https://etherscan.io/tx/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// Settings for one chain's node connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint (http or https).
    pub rpc_url: String,
    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// EIP-155 chain id; Ethereum only.
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Prefix that a transaction id is appended to.
    pub explorer_url: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ChainConfig {
    pub fn solana_mainnet() -> Self {
        Self {
            rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chain_id: None,
            explorer_url: DEFAULT_SOLANA_EXPLORER_URL.to_string(),
        }
    }

    pub fn ethereum_mainnet() -> Self {
        Self {
            rpc_url: DEFAULT_ETHEREUM_RPC_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chain_id: Some(ETHEREUM_MAINNET_CHAIN_ID),
            explorer_url: DEFAULT_ETHEREUM_EXPLORER_URL.to_string(),
        }
    }

    /// Same defaults, different node.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Chain id used when signing; mainnet when unset.
    pub fn chain_id_or_default(&self) -> u64 {
        self.chain_id.unwrap_or(ETHEREUM_MAINNET_CHAIN_ID)
    }

    /// Explorer link for a submitted transaction.
    pub fn explorer_tx_url(&self, tx_id: &str) -> String {
        format!("{}{}", self.explorer_url, tx_id)
    }

    pub fn validate(&self, chain: ChainTag) -> Result<(), WalletError> {
        if self.rpc_url.is_empty() {
            return Err(WalletError::Config(format!("{chain} rpc_url must not be empty")));
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(WalletError::Config(format!(
                "{chain} rpc_url must start with http:// or https://, got {}",
                self.rpc_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(WalletError::Config(format!("{chain} timeout_secs must be > 0")));
        }
        if chain == ChainTag::Solana && self.chain_id.is_some() {
            return Err(WalletError::Config("chain_id only applies to Ethereum".into()));
        }
        Ok(())
    }
}

/// Configuration for both chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "ChainConfig::solana_mainnet")]
    pub solana: ChainConfig,
    #[serde(default = "ChainConfig::ethereum_mainnet")]
    pub ethereum: ChainConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            solana: ChainConfig::solana_mainnet(),
            ethereum: ChainConfig::ethereum_mainnet(),
        }
    }
}

impl WalletConfig {
    pub fn chain(&self, chain: ChainTag) -> &ChainConfig {
        match chain {
            ChainTag::Solana => &self.solana,
            ChainTag::Ethereum => &self.ethereum,
        }
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        self.solana.validate(ChainTag::Solana)?;
        self.ethereum.validate(ChainTag::Ethereum)?;
        Ok(())
    }
}
