use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::address_to_bytes;
use crate::error::EthError;

/// Gas used by a plain value transfer to an externally owned account.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Smallest-unit exponent: 1 ETH = 10^18 wei.
pub const ETH_DECIMALS: u32 = 18;

/// EIP-2718 type byte for EIP-1559 transactions.
const EIP1559_TX_TYPE: u8 = 0x02;

/// An unsigned EIP-1559 (type 2) native value transfer.
#[derive(Debug, Clone)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    /// Recipient address as a 0x-prefixed hex string.
    pub to: String,
    /// Transfer value in wei.
    pub value: u128,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// `0x02 || rlp(signed fields)`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx`, 0x-prefixed hex.
    pub tx_hash: String,
}

/// Builds an unsigned EIP-1559 ETH transfer.
///
/// The priority fee is capped at the max fee, since a node would reject a
/// transaction whose tip exceeds its fee cap.
pub fn build_transfer(
    chain_id: u64,
    nonce: u64,
    to: &str,
    value_wei: u128,
    max_priority_fee: u128,
    max_fee: u128,
    gas_limit: u64,
) -> Result<EthTransaction, EthError> {
    address_to_bytes(to)?;

    if gas_limit == 0 {
        return Err(EthError::TransactionBuildError("gas limit must be > 0".into()));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: max_priority_fee.min(max_fee),
        max_fee_per_gas: max_fee,
        gas_limit,
        to: to.to_string(),
        value: value_wei,
    })
}

/// Fee cap for a type-2 transaction: twice the current base fee plus the
/// tip, so the transaction stays includable while the base fee rises for a
/// few blocks. `None` on overflow.
pub fn max_fee_for_base_fee(base_fee: u128, max_priority_fee: u128) -> Option<u128> {
    base_fee.checked_mul(2)?.checked_add(max_priority_fee)
}

/// Signs an EIP-1559 transaction with a secp256k1 private key.
///
/// 1. `payload = 0x02 || rlp([chain_id, nonce, tip, fee_cap, gas, to, value, data, access_list])`
/// 2. Sign `keccak256(payload)` (RFC 6979, low-S, recoverable).
/// 3. Append `y_parity, r, s` to the RLP list and prefix with 0x02.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    let unsigned_payload = encode_unsigned_tx(tx)?;
    let msg_hash = Keccak256::digest(&unsigned_payload);
    let (y_parity, r, s) = sign_prehash(&msg_hash[..], private_key)?;

    let signed_fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(address_to_bytes(&tx.to)?),
        value: tx.value,
        data: RlpBytes(Vec::new()),
        access_list: Vec::new(),
        signature_y_parity: y_parity,
        signature_r: RlpU256(r),
        signature_s: RlpU256(s),
    };

    let mut rlp_buf = Vec::new();
    signed_fields.encode(&mut rlp_buf);

    let mut raw_tx = Vec::with_capacity(1 + rlp_buf.len());
    raw_tx.push(EIP1559_TX_TYPE);
    raw_tx.extend_from_slice(&rlp_buf);

    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

/// Recoverable secp256k1 signature over a 32-byte prehash, as
/// `(y_parity, r, s)`. RFC 6979 nonces, low-S.
fn sign_prehash(prehash: &[u8], private_key: &[u8; 32]) -> Result<(u8, [u8; 32], [u8; 32]), EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    key_bytes.zeroize();

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(prehash)
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());

    Ok((recovery_id.is_y_odd() as u8, r, s))
}

/// Encodes the unsigned transaction as `0x02 || rlp(fields)`; its Keccak-256
/// is the signing hash.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Result<Vec<u8>, EthError> {
    let unsigned_fields = UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(address_to_bytes(&tx.to)?),
        value: tx.value,
        data: RlpBytes(Vec::new()),
        access_list: Vec::new(),
    };

    let mut rlp_buf = Vec::new();
    unsigned_fields.encode(&mut rlp_buf);

    let mut payload = Vec::with_capacity(1 + rlp_buf.len());
    payload.push(EIP1559_TX_TYPE);
    payload.extend_from_slice(&rlp_buf);

    Ok(payload)
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: u128,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// EIP-2930 access list entry; transfers always send an empty list.
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: RlpAddress,
    storage_keys: Vec<RlpU256>,
}

/// 20-byte address encoded as an RLP string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Byte string payload (calldata). A `Vec<u8>` would encode as a list of
/// integers, so the bytes go through the slice impl instead.
#[derive(Debug, Clone)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// 256-bit big-endian integer with leading zeros stripped.
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{address_from_private_key, pubkey_to_eth_address};
    use k256::ecdsa::VerifyingKey;

    const TEST_PRIVKEY: [u8; 32] = {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    };

    const ONE_ETH: u128 = 10u128.pow(ETH_DECIMALS);

    const TEST_ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

    fn one_eth_transfer(nonce: u64) -> EthTransaction {
        build_transfer(
            1,
            nonce,
            TEST_ADDRESS,
            ONE_ETH,
            1_000_000_000,
            50_000_000_000,
            TRANSFER_GAS_LIMIT,
        )
        .unwrap()
    }

    #[test]
    fn build_transfer_fields() {
        let tx = one_eth_transfer(0);
        assert_eq!(tx.chain_id, 1);
        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas_limit, 21_000);
        assert_eq!(tx.value, ONE_ETH);
    }

    #[test]
    fn build_transfer_caps_priority_fee() {
        let tx = build_transfer(1, 0, TEST_ADDRESS, 1, 90, 50, TRANSFER_GAS_LIMIT).unwrap();
        assert_eq!(tx.max_priority_fee_per_gas, 50);
        assert_eq!(tx.max_fee_per_gas, 50);
    }

    #[test]
    fn max_fee_leaves_base_fee_headroom() {
        assert_eq!(max_fee_for_base_fee(20_000_000_000, 1_000_000_000), Some(41_000_000_000));
        assert_eq!(max_fee_for_base_fee(0, 5), Some(5));
        assert_eq!(max_fee_for_base_fee(u128::MAX / 2 + 1, 0), None);
    }

    #[test]
    fn build_transfer_rejects_bad_input() {
        assert!(build_transfer(1, 0, "bad-address", 0, 0, 0, 21_000).is_err());
        assert!(build_transfer(1, 0, TEST_ADDRESS, 0, 0, 0, 0).is_err());
    }

    #[test]
    fn unsigned_encoding_matches_reference() {
        // Independently RLP-encoded reference for the same field values.
        let encoded = encode_unsigned_tx(&one_eth_transfer(0)).unwrap();
        assert_eq!(
            hex::encode(encoded),
            "02f00180843b9aca00850ba43b740082520894000000000000000000000000000000000000dead\
             880de0b6b3a764000080c0"
        );
    }

    #[test]
    fn signature_recovers_sender() {
        let tx = one_eth_transfer(3);
        let msg_hash = Keccak256::digest(encode_unsigned_tx(&tx).unwrap());
        let (y_parity, r, s) = sign_prehash(&msg_hash[..], &TEST_PRIVKEY).unwrap();

        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&r);
        rs[32..].copy_from_slice(&s);
        let signature = Signature::from_slice(&rs).unwrap();
        let recid = RecoveryId::from_byte(y_parity).unwrap();

        let recovered = VerifyingKey::recover_from_prehash(&msg_hash[..], &signature, recid).unwrap();
        let pubkey: [u8; 65] = recovered
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .unwrap();
        assert_eq!(
            pubkey_to_eth_address(&pubkey).unwrap(),
            address_from_private_key(&TEST_PRIVKEY).unwrap()
        );
    }

    #[test]
    fn signed_tx_shape() {
        let signed = sign_transaction(&one_eth_transfer(0), &TEST_PRIVKEY).unwrap();
        assert_eq!(signed.raw_tx[0], 0x02);
        // Long list header: 0xf8 + one length byte.
        assert_eq!(signed.raw_tx[1], 0xf8);
        assert_eq!(signed.raw_tx[2] as usize, signed.raw_tx.len() - 3);
        assert!(signed.tx_hash.starts_with("0x"));
        assert_eq!(signed.tx_hash.len(), 66);
    }

    #[test]
    fn signing_is_deterministic() {
        let a = sign_transaction(&one_eth_transfer(0), &TEST_PRIVKEY).unwrap();
        let b = sign_transaction(&one_eth_transfer(0), &TEST_PRIVKEY).unwrap();
        assert_eq!(a.raw_tx, b.raw_tx);
        assert_eq!(a.tx_hash, b.tx_hash);
    }

    #[test]
    fn different_nonces_differ() {
        let a = sign_transaction(&one_eth_transfer(0), &TEST_PRIVKEY).unwrap();
        let b = sign_transaction(&one_eth_transfer(1), &TEST_PRIVKEY).unwrap();
        assert_ne!(a.tx_hash, b.tx_hash);
    }

    #[test]
    fn invalid_private_key_rejected() {
        assert!(sign_transaction(&one_eth_transfer(0), &[0u8; 32]).is_err());
    }

    #[test]
    fn rlp_u256_encoding() {
        let mut buf = Vec::new();
        RlpU256([0u8; 32]).encode(&mut buf);
        assert_eq!(buf, vec![0x80]);

        let mut value = [0u8; 32];
        value[31] = 42;
        let mut buf = Vec::new();
        RlpU256(value).encode(&mut buf);
        assert_eq!(buf, vec![42]);
    }

    #[test]
    fn rlp_empty_bytes_is_empty_string() {
        let mut buf = Vec::new();
        RlpBytes(Vec::new()).encode(&mut buf);
        assert_eq!(buf, vec![0x80]);
    }
}
