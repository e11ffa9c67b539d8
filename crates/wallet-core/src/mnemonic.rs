use bip39::{Language, Mnemonic};
use crypto_utils::{random, SecretBytes, ZeroizingString};
use zeroize::Zeroize;

use crate::error::WalletError;

/// Entropy for a 12-word phrase.
const ENTROPY_BYTES: usize = 16;

/// Generate a new 12-word BIP-39 mnemonic (128 bits of entropy).
///
/// Fails with `EntropyUnavailable` if the OS generator cannot be read; there
/// is no fallback source.
pub fn generate_mnemonic() -> Result<ZeroizingMnemonic, WalletError> {
    let mut entropy = random::random_array::<ENTROPY_BYTES>()?;
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(ZeroizingMnemonic {
        phrase: ZeroizingString::new(mnemonic?.to_string()),
    })
}

/// Whether `phrase` is a valid English BIP-39 mnemonic (words and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derive the 64-byte seed from mnemonic + optional passphrase
/// (PBKDF2-HMAC-SHA512, 2048 rounds). The seed is wiped on drop.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<SecretBytes<64>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    Ok(SecretBytes::new(mnemonic.to_seed(passphrase)))
}

/// Get the word list for autocomplete
pub fn word_list() -> &'static [&'static str] {
    Language::English.word_list()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

/// A validated mnemonic phrase, wiped from memory on drop.
#[derive(Debug, Clone)]
pub struct ZeroizingMnemonic {
    phrase: ZeroizingString,
}

impl ZeroizingMnemonic {
    pub fn new(phrase: &str) -> Result<Self, WalletError> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        if !validate_mnemonic(&normalized) {
            return Err(WalletError::InvalidMnemonic(
                "unknown word, wrong word count or bad checksum".into(),
            ));
        }
        Ok(Self {
            phrase: ZeroizingString::new(normalized),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn to_seed(&self, passphrase: &str) -> Result<SecretBytes<64>, WalletError> {
        mnemonic_to_seed(&self.phrase, passphrase)
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_mnemonic_12_words() {
        let mnemonic = generate_mnemonic().unwrap();
        assert_eq!(mnemonic.words().len(), 12);
        assert!(validate_mnemonic(mnemonic.as_str()));
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        let a = generate_mnemonic().unwrap();
        let b = generate_mnemonic().unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_validate_invalid_mnemonic() {
        assert!(!validate_mnemonic("invalid mnemonic phrase here"));
        // valid words, bad checksum
        assert!(!validate_mnemonic(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
    }

    #[test]
    fn test_bad_checksum_rejected_by_seed() {
        let err = mnemonic_to_seed(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_mnemonic_to_seed_deterministic() {
        let seed1 = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let seed2 = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        assert_eq!(seed1, seed2);
        assert_eq!(seed1.len(), 64);
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let seed_no_pass = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let seed_with_pass = mnemonic_to_seed(TEST_MNEMONIC, "mypassphrase").unwrap();
        assert_ne!(seed_no_pass, seed_with_pass);
    }

    #[test]
    fn test_bip39_test_vector() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        assert_eq!(
            hex::encode(seed.expose()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("abandon"));
        assert!(is_valid_word("zoo"));
        assert!(!is_valid_word("notaword"));
        assert!(!is_valid_word(""));
        assert_eq!(word_list().len(), 2048);
    }

    #[test]
    fn test_zeroizing_mnemonic_normalizes_whitespace() {
        let zm = ZeroizingMnemonic::new(&format!("  {}  ", TEST_MNEMONIC.replace(' ', "   "))).unwrap();
        assert_eq!(zm.as_str(), TEST_MNEMONIC);
        assert_eq!(zm.words().len(), 12);
        assert_eq!(zm.to_seed("").unwrap(), mnemonic_to_seed(TEST_MNEMONIC, "").unwrap());
    }

    #[test]
    fn test_debug_redacts_phrase() {
        let zm = ZeroizingMnemonic::new(TEST_MNEMONIC).unwrap();
        assert!(!format!("{zm:?}").contains("abandon"));
    }
}
