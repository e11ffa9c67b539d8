use chrono::{DateTime, Utc};
use crypto_utils::SecretBytes;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two supported chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainTag {
    Solana,
    Ethereum,
}

impl ChainTag {
    /// BIP-44 coin type for this chain
    pub fn coin_type(&self) -> u32 {
        match self {
            ChainTag::Solana => 501,
            ChainTag::Ethereum => 60,
        }
    }

    pub fn curve(&self) -> CurveType {
        match self {
            ChainTag::Solana => CurveType::Ed25519,
            ChainTag::Ethereum => CurveType::Secp256k1,
        }
    }

    /// Number of fractional digits between the display unit and the
    /// smallest on-chain unit (lamports, wei).
    pub fn decimals(&self) -> u32 {
        match self {
            ChainTag::Solana => chain_sol::SOL_DECIMALS,
            ChainTag::Ethereum => chain_eth::ETH_DECIMALS,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChainTag::Solana => "Solana",
            ChainTag::Ethereum => "Ethereum",
        }
    }

    /// Native token symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ChainTag::Solana => "SOL",
            ChainTag::Ethereum => "ETH",
        }
    }
}

impl std::fmt::Display for ChainTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveType {
    Secp256k1,
    Ed25519,
}

/// Cached balance in display units.
///
/// A failed query yields `Unknown`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Balance {
    Known(Decimal),
    Unknown,
}

impl Balance {
    pub fn known(&self) -> Option<Decimal> {
        match self {
            Balance::Known(amount) => Some(*amount),
            Balance::Unknown => None,
        }
    }
}

/// A derived account on one chain.
///
/// The address is a pure function of the seed and the derivation path. The
/// private key is wiped when the account is dropped.
#[derive(Debug, Clone)]
pub struct Account {
    pub chain: ChainTag,
    pub index: u32,
    pub derivation_path: String,
    pub address: String,
    pub private_key: SecretBytes<32>,
    pub balance: Balance,
    /// Cleared after a successful send; set again by a successful refresh.
    pub balance_fresh: bool,
}

impl Account {
    /// Private key in the form wallets usually import.
    ///
    /// - Ethereum: `0x` + 64 hex characters of the secp256k1 scalar
    /// - Solana: 128 hex characters of the 64-byte keypair (secret || public)
    pub fn export_private_key(&self) -> String {
        match self.chain {
            ChainTag::Ethereum => format!("0x{}", hex::encode(self.private_key.expose())),
            ChainTag::Solana => {
                let keypair = SecretBytes::new(chain_sol::keypair_bytes(self.private_key.expose()));
                hex::encode(keypair.expose())
            }
        }
    }
}

/// A native transfer from a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub chain: ChainTag,
    /// Derivation index of the sending account.
    pub sender_index: u32,
    /// Destination, validated before any network call.
    pub to: String,
    /// Amount in display units (SOL, ETH).
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Submitted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub status: TransferStatus,
    /// Transaction id (base58 signature or 0x hash) once submitted.
    pub tx_id: Option<String>,
    /// Raw node or transport message when the send failed.
    pub reason: Option<String>,
}

impl TransferResult {
    pub fn submitted(tx_id: String) -> Self {
        Self {
            status: TransferStatus::Submitted,
            tx_id: Some(tx_id),
            reason: None,
        }
    }

    pub fn failed(reason: String) -> Self {
        Self {
            status: TransferStatus::Failed,
            tx_id: None,
            reason: Some(reason),
        }
    }
}

/// One entry of the in-memory transfer history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub sender_index: u32,
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub status: TransferStatus,
    pub tx_id: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
