use thiserror::Error;

/// Errors raised while parsing or deriving key material.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),
}
