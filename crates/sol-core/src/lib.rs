//! Key material and primitive identifiers for the Solana client SDK.
//!
//! Everything a transaction or RPC call names on-chain is one of three
//! fixed-size values: a 32-byte Ed25519 public key, a 32-byte blockhash,
//! or a 64-byte detached signature. All three travel as Base58 text in the
//! JSON-RPC protocol and as raw bytes in the transaction wire format, so
//! each type here carries both representations.
//!
//! Signing uses `ed25519-dalek`; program-derived addresses additionally
//! need `curve25519-dalek` to prove the derived point is off the curve.

pub mod error;
pub mod hash;
pub mod keypair;
pub mod pubkey;
pub mod signature;

pub use error::CoreError;
pub use hash::{Hash, HASH_LEN};
pub use keypair::{Keypair, KEYPAIR_LEN};
pub use pubkey::{PublicKey, MAX_SEEDS, MAX_SEED_LEN, PUBKEY_LEN};
pub use signature::{Signature, SIGNATURE_LEN};
