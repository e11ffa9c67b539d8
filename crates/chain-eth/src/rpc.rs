//! JSON-RPC method names, parameter builders and result parsers for the
//! Ethereum execution API.

use serde_json::{json, Value};

use crate::address::validate_address;
use crate::error::EthError;

pub const GET_BALANCE: &str = "eth_getBalance";
pub const GET_TRANSACTION_COUNT: &str = "eth_getTransactionCount";
pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
pub const GAS_PRICE: &str = "eth_gasPrice";
pub const MAX_PRIORITY_FEE_PER_GAS: &str = "eth_maxPriorityFeePerGas";
pub const SEND_RAW_TRANSACTION: &str = "eth_sendRawTransaction";

pub fn get_balance_params(address: &str) -> Value {
    json!([address, "latest"])
}

/// Nonce for the next transaction, counting ones still in the mempool.
pub fn get_transaction_count_params(address: &str) -> Value {
    json!([address, "pending"])
}

pub fn no_params() -> Value {
    json!([])
}

/// Latest block header without transaction bodies.
pub fn latest_block_params() -> Value {
    json!(["latest", false])
}

/// Parameters for `eth_sendRawTransaction` with the raw bytes 0x-hex encoded.
pub fn send_raw_transaction_params(raw_tx: &[u8]) -> Value {
    json!([format!("0x{}", hex::encode(raw_tx))])
}

/// Parses a hex quantity (`"0x1b4"`) into a u128.
///
/// Quantities must be `0x`-prefixed; `"0x"` alone and values wider than
/// 128 bits are rejected.
pub fn parse_quantity(result: &Value) -> Result<u128, EthError> {
    let text = result
        .as_str()
        .ok_or_else(|| EthError::MalformedResponse(format!("expected hex quantity, got {result}")))?;

    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| EthError::MalformedResponse(format!("quantity missing 0x prefix: {text}")))?;

    if digits.is_empty() {
        return Err(EthError::MalformedResponse("empty quantity".into()));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| EthError::MalformedResponse(format!("invalid quantity {text}: {e}")))
}

/// Nonce from an `eth_getTransactionCount` result.
pub fn parse_nonce(result: &Value) -> Result<u64, EthError> {
    let nonce = parse_quantity(result)?;
    u64::try_from(nonce)
        .map_err(|_| EthError::MalformedResponse(format!("nonce out of range: {nonce}")))
}

/// `baseFeePerGas` of an `eth_getBlockByNumber` result.
///
/// `None` for blocks from chains without EIP-1559.
pub fn parse_base_fee(result: &Value) -> Result<Option<u128>, EthError> {
    if result.is_null() {
        return Err(EthError::MalformedResponse("block not found".into()));
    }
    match result.get("baseFeePerGas") {
        None | Some(Value::Null) => Ok(None),
        Some(base_fee) => parse_quantity(base_fee).map(Some),
    }
}

/// Transaction hash returned by `eth_sendRawTransaction`.
pub fn parse_tx_hash(result: &Value) -> Result<String, EthError> {
    let hash = result
        .as_str()
        .ok_or_else(|| EthError::MalformedResponse(format!("expected tx hash, got {result}")))?;

    let valid = hash
        .strip_prefix("0x")
        .map(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if !valid {
        return Err(EthError::MalformedResponse(format!("invalid tx hash: {hash}")));
    }

    Ok(hash.to_lowercase())
}

/// Address param guard so a malformed address never reaches the node.
pub fn checked_address(address: &str) -> Result<&str, EthError> {
    validate_address(address)?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_params_use_latest() {
        let params = get_balance_params("0x1cc31e180cca3a8698fd6f13765209ec7cb9e755");
        assert_eq!(params[1], "latest");
    }

    #[test]
    fn nonce_params_use_pending() {
        let params = get_transaction_count_params("0x1cc31e180cca3a8698fd6f13765209ec7cb9e755");
        assert_eq!(params[1], "pending");
    }

    #[test]
    fn quantity_parsed() {
        assert_eq!(parse_quantity(&json!("0x0")).unwrap(), 0);
        assert_eq!(parse_quantity(&json!("0x1b4")).unwrap(), 436);
        assert_eq!(
            parse_quantity(&json!("0xde0b6b3a7640000")).unwrap(),
            1_000_000_000_000_000_000
        );
    }

    #[test]
    fn quantity_malformed() {
        assert!(parse_quantity(&json!("1b4")).is_err());
        assert!(parse_quantity(&json!("0x")).is_err());
        assert!(parse_quantity(&json!("0xzz")).is_err());
        assert!(parse_quantity(&json!(436)).is_err());
        // 33 hex digits overflow u128
        assert!(parse_quantity(&json!(format!("0x1{}", "0".repeat(32)))).is_err());
    }

    #[test]
    fn nonce_parsed() {
        assert_eq!(parse_nonce(&json!("0x7")).unwrap(), 7);
        assert!(parse_nonce(&json!(format!("0x1{}", "0".repeat(16)))).is_err());
    }

    #[test]
    fn send_params_are_hex() {
        assert_eq!(send_raw_transaction_params(&[0x02, 0xc0]), json!(["0x02c0"]));
    }

    #[test]
    fn base_fee_parsed() {
        let block = json!({ "number": "0x10", "baseFeePerGas": "0x3b9aca00" });
        assert_eq!(parse_base_fee(&block).unwrap(), Some(1_000_000_000));
        assert_eq!(latest_block_params(), json!(["latest", false]));
    }

    #[test]
    fn base_fee_absent_on_legacy_chain() {
        assert_eq!(parse_base_fee(&json!({ "number": "0x10" })).unwrap(), None);
        assert_eq!(parse_base_fee(&json!({ "baseFeePerGas": null })).unwrap(), None);
    }

    #[test]
    fn base_fee_malformed() {
        assert!(parse_base_fee(&Value::Null).is_err());
        assert!(parse_base_fee(&json!({ "baseFeePerGas": 7 })).is_err());
    }

    #[test]
    fn tx_hash_parsed() {
        let hash = format!("0x{}", "Ab".repeat(32));
        assert_eq!(parse_tx_hash(&json!(hash)).unwrap(), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn tx_hash_malformed() {
        assert!(parse_tx_hash(&json!("0x1234")).is_err());
        assert!(parse_tx_hash(&json!("ab".repeat(33))).is_err());
        assert!(parse_tx_hash(&Value::Null).is_err());
    }

    #[test]
    fn checked_address_rejects_garbage() {
        assert!(checked_address("0xnothex").is_err());
        assert!(checked_address("0x1cc31e180cca3a8698fd6f13765209ec7cb9e755").is_ok());
    }
}
