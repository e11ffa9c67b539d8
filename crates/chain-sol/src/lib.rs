//! Solana chain support for the wallet core.
//!
//! Address encoding, native SOL transfer construction in the compact wire
//! format, Ed25519 signing and the JSON-RPC request/response shapes used to
//! talk to a Solana node. Nothing here performs I/O; the transport lives in
//! `wallet-core`.

pub mod address;
pub mod error;
pub mod rpc;
pub mod transaction;

pub use address::{
    address_to_bytes, bytes_to_address, keypair_bytes, keypair_to_address, pubkey_from_private_key,
    validate_address,
};
pub use error::SolError;
pub use transaction::{
    build_sol_transfer, compile_transaction, encode_compact_u16, serialize_message,
    sign_transaction, CompiledInstruction, SignedSolTransaction, SolAccountMeta, SolInstruction,
    SolTransaction, SOL_DECIMALS, SYSTEM_PROGRAM_ID,
};
