use parking_lot::RwLock;

use crate::error::WalletError;
use crate::types::{Account, Balance, ChainTag};

/// Append-only, in-memory list of one chain's accounts, ordered by
/// derivation index (position == index).
///
/// Every entry carries a balance epoch that [`mark_stale`](Self::mark_stale)
/// bumps. A balance fetched under an older epoch is discarded by
/// [`update_balance_if_current`](Self::update_balance_if_current).
#[derive(Debug)]
pub struct AccountRegistry {
    chain: ChainTag,
    entries: RwLock<Vec<Entry>>,
}

#[derive(Debug)]
struct Entry {
    account: Account,
    epoch: u64,
}

impl AccountRegistry {
    pub fn new(chain: ChainTag) -> Self {
        Self {
            chain,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn chain(&self) -> ChainTag {
        self.chain
    }

    /// Append an account whose index equals the current length.
    pub fn append(&self, account: Account) -> Result<(), WalletError> {
        if account.chain != self.chain {
            return Err(WalletError::DerivationFailed(format!(
                "cannot add a {} account to the {} registry",
                account.chain, self.chain
            )));
        }

        let mut entries = self.entries.write();
        if account.index as usize != entries.len() {
            return Err(WalletError::DerivationFailed(format!(
                "expected account index {}, got {}",
                entries.len(),
                account.index
            )));
        }
        entries.push(Entry { account, epoch: 0 });
        Ok(())
    }

    pub fn get(&self, index: u32) -> Result<Account, WalletError> {
        self.entries
            .read()
            .get(index as usize)
            .map(|entry| entry.account.clone())
            .ok_or(WalletError::AccountNotFound(index))
    }

    /// Snapshot of every account in index order.
    pub fn all(&self) -> Vec<Account> {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.account.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current balance epoch of one account. Capture it before fetching a
    /// balance and hand it back to `update_balance_if_current`.
    pub fn balance_epoch(&self, index: u32) -> Result<u64, WalletError> {
        self.entries
            .read()
            .get(index as usize)
            .map(|entry| entry.epoch)
            .ok_or(WalletError::AccountNotFound(index))
    }

    /// Replace the cached balance of one account. A known balance is fresh,
    /// `Unknown` is not.
    pub fn update_balance(&self, index: u32, balance: Balance) -> Result<(), WalletError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(index as usize)
            .ok_or(WalletError::AccountNotFound(index))?;
        set_balance(&mut entry.account, balance);
        Ok(())
    }

    /// Like `update_balance`, but only if the account has not been marked
    /// stale since `epoch` was read. Returns whether the balance was stored.
    pub fn update_balance_if_current(
        &self,
        index: u32,
        epoch: u64,
        balance: Balance,
    ) -> Result<bool, WalletError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(index as usize)
            .ok_or(WalletError::AccountNotFound(index))?;
        if entry.epoch != epoch {
            return Ok(false);
        }
        set_balance(&mut entry.account, balance);
        Ok(true)
    }

    /// Keep the cached balance but flag it as out of date.
    pub fn mark_stale(&self, index: u32) -> Result<(), WalletError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(index as usize)
            .ok_or(WalletError::AccountNotFound(index))?;
        entry.account.balance_fresh = false;
        entry.epoch += 1;
        Ok(())
    }
}

fn set_balance(account: &mut Account, balance: Balance) {
    account.balance_fresh = matches!(balance, Balance::Known(_));
    account.balance = balance;
}
