use bip32::{DerivationPath, XPrv};
use crypto_utils::kdf::{hmac_sha512, split_key_and_chain_code};
use crypto_utils::SecretBytes;
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::types::{ChainTag, CurveType};

/// Hardened-bit offset; indices at or above this cannot be hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// SLIP-0010 master key domain for Ed25519.
const ED25519_SEED_KEY: &[u8] = b"ed25519 seed";

/// Derivation path for account `index` on `chain`: `m/44'/<coin>'/<index>'/0'`.
///
/// Every segment is hardened on both chains. SLIP-0010 Ed25519 only supports
/// hardened children; secp256k1 follows the same shape so an index means the
/// same thing on either chain.
pub fn derivation_path(chain: ChainTag, index: u32) -> Result<String, WalletError> {
    if index >= HARDENED_OFFSET {
        return Err(WalletError::DerivationFailed(format!(
            "account index {index} cannot be hardened"
        )));
    }
    Ok(format!("m/44'/{}'/{}'/0'", chain.coin_type(), index))
}

/// Derive the private key for account `index` on `chain` from a 64-byte seed.
pub fn derive_key(seed: &[u8], chain: ChainTag, index: u32) -> Result<DerivedKey, WalletError> {
    let path = derivation_path(chain, index)?;
    match chain.curve() {
        CurveType::Secp256k1 => derive_secp256k1_key(seed, &path),
        CurveType::Ed25519 => derive_ed25519_key(seed, &path),
    }
}

/// Derive a secp256k1 private key from seed using BIP-32
pub fn derive_secp256k1_key(seed: &[u8], path_str: &str) -> Result<DerivedKey, WalletError> {
    let path: DerivationPath = path_str
        .parse()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(e.to_string()))?;

    let xprv = XPrv::derive_from_path(seed, &path)
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;

    let mut private_key_bytes: [u8; 32] = xprv.to_bytes().into();
    let private_key = SecretBytes::new(private_key_bytes);
    private_key_bytes.zeroize();

    Ok(DerivedKey {
        private_key,
        derivation_path: path_str.to_string(),
    })
}

/// Derive an Ed25519 private key from seed using SLIP-0010.
///
/// Master: `HMAC-SHA512(key = "ed25519 seed", data = seed)`. Each child:
/// `HMAC-SHA512(key = chain_code, data = 0x00 || key || ser32(i | 2^31))`.
pub fn derive_ed25519_key(seed: &[u8], path_str: &str) -> Result<DerivedKey, WalletError> {
    let components = parse_hardened_path(path_str)?;

    let mut output = hmac_sha512(ED25519_SEED_KEY, &[seed])?;
    let (mut key, mut chain_code) = split_key_and_chain_code(&output);

    for child_index in components {
        output.zeroize();
        output = hmac_sha512(
            &chain_code,
            &[&[0x00u8][..], &key[..], &(child_index | HARDENED_OFFSET).to_be_bytes()[..]],
        )?;
        key.zeroize();
        chain_code.zeroize();
        (key, chain_code) = split_key_and_chain_code(&output);
    }

    let derived = DerivedKey {
        private_key: SecretBytes::new(key),
        derivation_path: path_str.to_string(),
    };

    output.zeroize();
    key.zeroize();
    chain_code.zeroize();

    Ok(derived)
}

/// Parse "m/44'/501'/0'/0'" into [44, 501, 0, 0].
///
/// Every component must carry a hardened marker (`'` or `h`).
fn parse_hardened_path(path: &str) -> Result<Vec<u32>, WalletError> {
    let path = path
        .strip_prefix("m/")
        .ok_or_else(|| WalletError::DerivationFailed("Path must start with m/".into()))?;

    path.split('/')
        .map(|component| {
            let num_str = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| {
                    WalletError::DerivationFailed(format!(
                        "Ed25519 paths must be fully hardened, got {component}"
                    ))
                })?;
            let index = num_str
                .parse::<u32>()
                .map_err(|e| WalletError::DerivationFailed(format!("Invalid path component: {e}")))?;
            if index >= HARDENED_OFFSET {
                return Err(WalletError::DerivationFailed(format!(
                    "path component {index} out of range"
                )));
            }
            Ok(index)
        })
        .collect()
}

/// A derived private key and the path it came from.
#[derive(Debug)]
pub struct DerivedKey {
    pub private_key: SecretBytes<32>,
    pub derivation_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_seed() -> SecretBytes<64> {
        mnemonic_to_seed(TEST_MNEMONIC, "").unwrap()
    }

    #[test]
    fn test_paths() {
        assert_eq!(derivation_path(ChainTag::Ethereum, 0).unwrap(), "m/44'/60'/0'/0'");
        assert_eq!(derivation_path(ChainTag::Solana, 7).unwrap(), "m/44'/501'/7'/0'");
    }

    #[test]
    fn test_index_too_large_rejected() {
        let err = derivation_path(ChainTag::Solana, HARDENED_OFFSET).unwrap_err();
        assert!(matches!(err, WalletError::DerivationFailed(_)));
        assert!(derive_key(&test_seed(), ChainTag::Ethereum, u32::MAX).is_err());
    }

    #[test]
    fn test_derive_eth_key_vector() {
        let key = derive_key(&test_seed(), ChainTag::Ethereum, 0).unwrap();
        assert_eq!(key.derivation_path, "m/44'/60'/0'/0'");
        assert_eq!(
            hex::encode(key.private_key.expose()),
            "43ff9ebfdccfa25e3921d9500db2f946d46a525fa08004af7f98976d9706cd5c"
        );
    }

    #[test]
    fn test_derive_sol_key_vector() {
        let key = derive_key(&test_seed(), ChainTag::Solana, 0).unwrap();
        assert_eq!(key.derivation_path, "m/44'/501'/0'/0'");
        assert_eq!(
            hex::encode(key.private_key.expose()),
            "37df573b3ac4ad5b522e064e25b63ea16bcbe79d449e81a0268d1047948bb445"
        );
    }

    #[test]
    fn test_derivation_deterministic() {
        let seed = test_seed();
        for chain in [ChainTag::Ethereum, ChainTag::Solana] {
            let key1 = derive_key(&seed, chain, 3).unwrap();
            let key2 = derive_key(&seed, chain, 3).unwrap();
            assert_eq!(key1.private_key, key2.private_key);
        }
    }

    #[test]
    fn test_different_indices_different_keys() {
        let seed = test_seed();
        let key0 = derive_key(&seed, ChainTag::Solana, 0).unwrap();
        let key1 = derive_key(&seed, ChainTag::Solana, 1).unwrap();
        assert_ne!(key0.private_key, key1.private_key);
    }

    #[test]
    fn test_slip10_master_chain_vector() {
        // SLIP-0010 test vector 1 for ed25519, chain m/0'
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = derive_ed25519_key(&seed, "m/0'").unwrap();
        assert_eq!(
            hex::encode(key.private_key.expose()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn test_parse_hardened_path() {
        assert_eq!(parse_hardened_path("m/44'/501'/0'/0'").unwrap(), vec![44, 501, 0, 0]);
        assert_eq!(parse_hardened_path("m/44h/501h").unwrap(), vec![44, 501]);
        assert!(parse_hardened_path("m/44'/501'/0/0'").is_err());
        assert!(parse_hardened_path("44'/501'").is_err());
    }
}
