//! # crypto-utils
//!
//! Secure randomness, HMAC-based key stretching helpers and zeroize-on-drop
//! containers shared by the wallet crates.

pub mod error;
pub mod kdf;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use zeroizing::{SecretBytes, ZeroizingString};
