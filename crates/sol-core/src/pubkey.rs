//! Solana public keys and program-derived addresses.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key. There is no hashing step (unlike Bitcoin or Ethereum): the public
//! key bytes ARE the address bytes.
//!
//! Program-derived addresses (PDAs) are the exception: they are SHA-256
//! digests of caller-chosen seeds plus the owning program id, bumped until
//! the result falls OFF the Ed25519 curve so that no private key can ever
//! sign for them.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::signature::Signature;

/// Number of bytes in a public key.
pub const PUBKEY_LEN: usize = 32;

/// Maximum number of seeds in a PDA derivation, including the bump.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single PDA seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// The string appended to every PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A 32-byte Ed25519 public key identifying an account.
///
/// Immutable once constructed. Displays as Base58; serde uses the same
/// textual form, which is what the JSON-RPC protocol expects.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBKEY_LEN]);

impl PublicKey {
    /// Wrap raw public key bytes.
    pub const fn new(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    /// Copy out the raw bytes.
    pub const fn to_bytes(self) -> [u8; PUBKEY_LEN] {
        self.0
    }

    /// Verify a detached Ed25519 signature over `message` against this key.
    ///
    /// Returns `false` both for a bad signature and for bytes that are not
    /// a valid Ed25519 point at all.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        key.verify_strict(message, &sig).is_ok()
    }

    /// Whether these bytes decompress to a valid Ed25519 curve point.
    ///
    /// Ordinary addresses are curve points; program-derived addresses must
    /// NOT be, which is what makes them unsignable.
    pub fn is_on_curve(&self) -> bool {
        curve25519_dalek::edwards::CompressedEdwardsY(self.0)
            .decompress()
            .is_some()
    }

    /// Derive a program address from the given seeds.
    ///
    /// `SHA-256(seed_0 || .. || seed_n || program_id || "ProgramDerivedAddress")`.
    /// Fails if any seed is too long, there are too many seeds, or the
    /// digest happens to be a valid curve point (callers normally append a
    /// bump seed and retry; see [`PublicKey::find_program_address`]).
    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &PublicKey,
    ) -> Result<PublicKey, CoreError> {
        check_seeds(seeds)?;
        try_program_address(seeds, &[], program_id).ok_or_else(|| {
            CoreError::InvalidSeeds("derived address falls on the ed25519 curve".into())
        })
    }

    /// Find the first viable program address for the seeds, searching bump
    /// values from 255 down to 0. Returns the address and the bump used.
    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &PublicKey,
    ) -> Result<(PublicKey, u8), CoreError> {
        if seeds.len() + 1 > MAX_SEEDS {
            return Err(CoreError::InvalidSeeds(format!(
                "expected at most {} seeds before the bump, got {}",
                MAX_SEEDS - 1,
                seeds.len()
            )));
        }
        check_seeds(seeds)?;

        for bump in (0u8..=u8::MAX).rev() {
            if let Some(address) = try_program_address(seeds, &[bump], program_id) {
                return Ok((address, bump));
            }
        }

        Err(CoreError::InvalidSeeds("no viable bump seed found".into()))
    }
}

/// Validate PDA seed count and lengths.
fn check_seeds(seeds: &[&[u8]]) -> Result<(), CoreError> {
    if seeds.len() > MAX_SEEDS {
        return Err(CoreError::InvalidSeeds(format!(
            "expected at most {MAX_SEEDS} seeds, got {}",
            seeds.len()
        )));
    }
    for seed in seeds {
        if seed.len() > MAX_SEED_LEN {
            return Err(CoreError::InvalidSeeds(format!(
                "seed of {} bytes exceeds the {MAX_SEED_LEN}-byte limit",
                seed.len()
            )));
        }
    }
    Ok(())
}

/// Hash seeds + bump + program id, returning `None` if the digest lands on
/// the curve (not a usable PDA, so the caller tries the next bump).
fn try_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &PublicKey,
) -> Option<PublicKey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let candidate = PublicKey::new(hasher.finalize().into());
    if candidate.is_on_curve() {
        return None;
    }
    Some(candidate)
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

// Debug mirrors Display: tools and explorers name accounts by their Base58
// form, so a raw byte dump would only obscure test output.
impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for PublicKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CoreError::InvalidPublicKey(format!("base58 decode failed: {e}")))?;
        PublicKey::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CoreError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; PUBKEY_LEN] = bytes.try_into().map_err(|_| {
            CoreError::InvalidPublicKey(format!("expected {PUBKEY_LEN} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
