//! JSON-RPC method names, parameter builders and result parsers for the
//! Solana node API. Transport is the caller's concern.

use base64::Engine;
use serde_json::{json, Value};

use crate::error::SolError;

pub const GET_BALANCE: &str = "getBalance";
pub const GET_LATEST_BLOCKHASH: &str = "getLatestBlockhash";
pub const SEND_TRANSACTION: &str = "sendTransaction";

pub fn get_balance_params(address: &str) -> Value {
    json!([address])
}

/// Lamports from a `getBalance` result.
///
/// Nodes answer `{"context": {...}, "value": <u64>}`; a bare integer is
/// accepted as well.
pub fn parse_balance(result: &Value) -> Result<u64, SolError> {
    let value = result.get("value").unwrap_or(result);
    value
        .as_u64()
        .ok_or_else(|| SolError::MalformedResponse(format!("expected lamports, got {value}")))
}

pub fn get_latest_blockhash_params() -> Value {
    json!([{ "commitment": "finalized" }])
}

/// The 32-byte blockhash from a `getLatestBlockhash` result.
pub fn parse_latest_blockhash(result: &Value) -> Result<[u8; 32], SolError> {
    let encoded = result
        .get("value")
        .and_then(|v| v.get("blockhash"))
        .and_then(Value::as_str)
        .ok_or_else(|| SolError::MalformedResponse(format!("missing blockhash in {result}")))?;

    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| SolError::MalformedResponse(format!("blockhash is not base58: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::MalformedResponse(format!("blockhash must be 32 bytes, got {}", v.len()))
    })
}

/// Parameters for `sendTransaction` with the wire bytes base64-encoded.
pub fn send_transaction_params(wire: &[u8]) -> Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
    json!([encoded, { "encoding": "base64", "preflightCommitment": "confirmed" }])
}

/// The base58 transaction signature returned by `sendTransaction`.
pub fn parse_signature(result: &Value) -> Result<String, SolError> {
    let signature = result
        .as_str()
        .ok_or_else(|| SolError::MalformedResponse(format!("expected signature, got {result}")))?;

    let decoded = bs58::decode(signature)
        .into_vec()
        .map_err(|e| SolError::MalformedResponse(format!("signature is not base58: {e}")))?;
    if decoded.len() != 64 {
        return Err(SolError::MalformedResponse(format!(
            "signature must be 64 bytes, got {}",
            decoded.len()
        )));
    }

    Ok(signature.to_string())
}
