use crate::error::WalletError;
use crate::hd_derivation::{self, DerivedKey};
use crate::types::{Account, Balance, ChainTag};

/// Chain-native address for a private key. Pure.
pub fn address_for_key(private_key: &[u8; 32], chain: ChainTag) -> Result<String, WalletError> {
    match chain {
        ChainTag::Ethereum => Ok(chain_eth::address_from_private_key(private_key)?),
        ChainTag::Solana => Ok(chain_sol::keypair_to_address(
            &chain_sol::pubkey_from_private_key(private_key),
        )),
    }
}

/// Build an account from a derived key. The balance starts `Unknown`.
pub fn build_account(key: DerivedKey, chain: ChainTag, index: u32) -> Result<Account, WalletError> {
    let address = address_for_key(key.private_key.expose(), chain)?;
    Ok(Account {
        chain,
        index,
        derivation_path: key.derivation_path,
        address,
        private_key: key.private_key,
        balance: Balance::Unknown,
        balance_fresh: false,
    })
}

/// Derive account `index` on `chain` straight from a seed.
pub fn derive_account(seed: &[u8], chain: ChainTag, index: u32) -> Result<Account, WalletError> {
    let key = hd_derivation::derive_key(seed, chain, index)?;
    build_account(key, chain, index)
}

/// Validate a destination address for a given chain
pub fn validate_address(address: &str, chain: ChainTag) -> Result<(), WalletError> {
    match chain {
        ChainTag::Ethereum => chain_eth::validate_address(address)?,
        ChainTag::Solana => chain_sol::validate_address(address)?,
    }
    Ok(())
}

/// EIP-55 rendering of an Ethereum address for display.
pub fn display_address(address: &str, chain: ChainTag) -> Result<String, WalletError> {
    match chain {
        ChainTag::Ethereum => Ok(chain_eth::checksum_address(address)?),
        ChainTag::Solana => Ok(address.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;
    use crypto_utils::SecretBytes;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> SecretBytes<64> {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_eth_vectors() {
        let seed = test_seed();
        let expected = [
            "0x1cc31e180cca3a8698fd6f13765209ec7cb9e755",
            "0x3590821f4fd8b921b74d923475b7da6c9b2ae83b",
            "0x33b1e0848dcc72662e60a70e40a65c40342ea971",
        ];
        for (index, address) in expected.iter().enumerate() {
            let account = derive_account(&seed, ChainTag::Ethereum, index as u32).unwrap();
            assert_eq!(account.address, *address);
            assert_eq!(account.derivation_path, format!("m/44'/60'/{index}'/0'"));
        }
    }

    #[test]
    fn test_sol_vectors() {
        let seed = test_seed();
        let expected = [
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk",
            "Hh8QwFUA6MtVu1qAoq12ucvFHNwCcVTV7hpWjeY1Hztb",
            "7WktogJEd2wQ9eH2oWusmcoFTgeYi6rS632UviTBJ2jm",
        ];
        for (index, address) in expected.iter().enumerate() {
            let account = derive_account(&seed, ChainTag::Solana, index as u32).unwrap();
            assert_eq!(account.address, *address);
            assert_eq!(account.derivation_path, format!("m/44'/501'/{index}'/0'"));
        }
    }

    #[test]
    fn test_derived_addresses_validate() {
        let seed = test_seed();
        for chain in [ChainTag::Ethereum, ChainTag::Solana] {
            for index in 0..5 {
                let account = derive_account(&seed, chain, index).unwrap();
                validate_address(&account.address, chain).unwrap();
            }
        }
    }

    #[test]
    fn test_new_account_balance_unknown() {
        let account = derive_account(&test_seed(), ChainTag::Solana, 0).unwrap();
        assert_eq!(account.balance, Balance::Unknown);
        assert!(!account.balance_fresh);
    }

    #[test]
    fn test_address_for_key_is_pure() {
        let mut key = [0u8; 32];
        key[31] = 1;
        assert_eq!(
            address_for_key(&key, ChainTag::Ethereum).unwrap(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
        assert_eq!(
            address_for_key(&key, ChainTag::Solana).unwrap(),
            address_for_key(&key, ChainTag::Solana).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_cross_chain() {
        assert!(validate_address("0x1cc31e180cca3a8698fd6f13765209ec7cb9e755", ChainTag::Solana).is_err());
        assert!(validate_address("HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk", ChainTag::Ethereum).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_in_base58() {
        let err = validate_address("0Agk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk", ChainTag::Solana)
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress(_)));
    }

    #[test]
    fn test_display_address_checksums_eth() {
        let shown = display_address("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf", ChainTag::Ethereum).unwrap();
        assert_eq!(shown, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }
}
