//! Transaction construction and encoding errors.

use sol_core::PublicKey;
use thiserror::Error;

/// Errors from building, signing, or encoding a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The transaction is structurally unusable: no instructions, no fee
    /// payer, a stale or missing blockhash, or too many accounts.
    #[error("invalid transaction: {0}")]
    Validation(String),

    /// The byte encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A supplied signer is not part of the compiled signer set.
    #[error("unknown signer: {0}")]
    MissingSigner(PublicKey),
}
