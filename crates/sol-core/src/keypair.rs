//! Ed25519 signing keys.
//!
//! A keypair is the only secret-holding type in this crate. It never
//! implements `Clone` or `Debug`-prints its secret half; callers that need
//! persistence go through [`Keypair::to_bytes`] explicitly.

use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::error::CoreError;
use crate::pubkey::PublicKey;
use crate::signature::Signature;

/// Number of bytes in the serialized form: 32-byte secret followed by the
/// 32-byte public key, the layout Solana tooling has always used.
pub const KEYPAIR_LEN: usize = 64;

/// An Ed25519 keypair that can sign transactions.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte secret seed.
    ///
    /// Derivation is deterministic: the same seed always yields the same
    /// keypair. The local copy of the seed is wiped before returning.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut secret = *seed;
        let signing_key = SigningKey::from_bytes(&secret);
        secret.zeroize();
        Self { signing_key }
    }

    /// Restore a keypair from its 64-byte serialized form.
    ///
    /// The public half must match the key derived from the secret half;
    /// a corrupted or spliced file is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut arr: [u8; KEYPAIR_LEN] = bytes.try_into().map_err(|_| {
            CoreError::InvalidSecretKey(format!(
                "expected {KEYPAIR_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        let result = SigningKey::from_keypair_bytes(&arr)
            .map(|signing_key| Self { signing_key })
            .map_err(|_| {
                CoreError::InvalidSecretKey("public half does not match secret half".into())
            });
        arr.zeroize();
        result
    }

    /// Serialize as 64 bytes: secret seed then public key.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LEN] {
        self.signing_key.to_keypair_bytes()
    }

    /// The public key for this keypair.
    pub fn pubkey(&self) -> PublicKey {
        PublicKey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message. Ed25519 is deterministic, so signing the
    /// same message twice yields identical bytes.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
