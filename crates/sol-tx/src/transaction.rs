//! Transaction building, signing, and the outer wire envelope.
//!
//! A [`Transaction`] accumulates instructions and signer state, then
//! compiles to a [`Message`] on demand. Signatures are kept per signer as
//! `Option<Signature>` so a transaction can move between parties and be
//! signed in stages; the envelope is:
//!
//! ```text
//! [compact-u16 signature count][64 bytes per signature][message bytes]
//! ```
//!
//! Unsigned slots serialize as 64 zero bytes when the caller opts out of
//! the all-signatures check, which is how partially signed transactions
//! are shipped to a co-signer.

use sol_core::{Hash, Keypair, PublicKey, Signature, SIGNATURE_LEN};

use crate::error::TransactionError;
use crate::instruction::{AccountMeta, Instruction};
use crate::message::Message;
use crate::shortvec;

// ---------------------------------------------------------------------------
// Signer slots
// ---------------------------------------------------------------------------

/// One required signer and its signature, if produced yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePubkeyPair {
    pub pubkey: PublicKey,
    pub signature: Option<Signature>,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction under construction, or decoded from the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Signer slots in compiled message order, filled by signing.
    pub signatures: Vec<SignaturePubkeyPair>,
    /// Account that pays fees; defaults to the first signer when unset.
    pub fee_payer: Option<PublicKey>,
    /// Replay protection; must be recent when the cluster sees it.
    pub recent_blockhash: Option<Hash>,
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction with an explicit fee payer.
    pub fn with_payer(fee_payer: PublicKey) -> Self {
        Self {
            fee_payer: Some(fee_payer),
            ..Self::default()
        }
    }

    /// Append an instruction. Chainable.
    pub fn add(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// The first signature, which doubles as the transaction id.
    pub fn signature(&self) -> Option<Signature> {
        self.signatures.first().and_then(|pair| pair.signature)
    }

    /// Compile to the canonical message form.
    ///
    /// Requires a recent blockhash and a fee payer; the payer falls back
    /// to the first signer slot when none was set explicitly.
    pub fn compile_message(&self) -> Result<Message, TransactionError> {
        let recent_blockhash = self.recent_blockhash.ok_or_else(|| {
            TransactionError::Validation("a recent blockhash is required".into())
        })?;
        let fee_payer = self
            .fee_payer
            .or_else(|| self.signatures.first().map(|pair| pair.pubkey))
            .ok_or_else(|| {
                TransactionError::Validation(
                    "no fee payer: set one explicitly or sign with the payer first".into(),
                )
            })?;
        Message::compile(&fee_payer, &self.instructions, &recent_blockhash)
    }

    /// The exact bytes a signer commits to.
    pub fn message_data(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(self.compile_message()?.serialize())
    }

    /// Sign with the full signer set, resetting any prior signatures.
    ///
    /// When no fee payer is set, the first signer becomes the payer. Every
    /// keypair must correspond to a required signer of the compiled
    /// message.
    pub fn sign(&mut self, signers: &[&Keypair]) -> Result<(), TransactionError> {
        let first = self.require_signers(signers)?;
        if self.fee_payer.is_none() {
            self.fee_payer = Some(first);
        }

        let message = self.compile_message()?;
        let data = message.serialize();
        self.signatures = signer_slots(&message)
            .map(|pubkey| SignaturePubkeyPair {
                pubkey,
                signature: None,
            })
            .collect();

        self.sign_slots(&data, signers)
    }

    /// Sign some of the required signers, keeping signatures already
    /// collected from others.
    pub fn partial_sign(&mut self, signers: &[&Keypair]) -> Result<(), TransactionError> {
        let first = self.require_signers(signers)?;
        if self.fee_payer.is_none() {
            self.fee_payer = Some(first);
        }

        let message = self.compile_message()?;
        let data = message.serialize();
        self.rebuild_slots(&message);

        self.sign_slots(&data, signers)
    }

    /// Attach an externally produced signature for one required signer.
    ///
    /// The signature is stored as-is; [`Transaction::verify_signatures`]
    /// is the place to check it.
    pub fn add_signature(
        &mut self,
        pubkey: &PublicKey,
        signature: Signature,
    ) -> Result<(), TransactionError> {
        if self.signatures.is_empty() {
            let message = self.compile_message()?;
            self.rebuild_slots(&message);
        }
        let slot = self
            .signatures
            .iter_mut()
            .find(|pair| pair.pubkey == *pubkey)
            .ok_or(TransactionError::MissingSigner(*pubkey))?;
        slot.signature = Some(signature);
        Ok(())
    }

    /// Whether every required signer has produced a valid signature over
    /// the current message bytes.
    ///
    /// `Ok(false)` covers both missing and invalid signatures; an error
    /// means the transaction cannot even be compiled.
    pub fn verify_signatures(&self) -> Result<bool, TransactionError> {
        let data = self.message_data()?;
        for pair in &self.signatures {
            match pair.signature {
                Some(signature) if pair.pubkey.verify(&data, &signature) => {}
                _ => return Ok(false),
            }
        }
        Ok(!self.signatures.is_empty())
    }

    /// Serialize to the wire envelope.
    ///
    /// With `require_all_signatures` every signer slot must be filled;
    /// without it, missing signatures become 64 zero bytes so a partially
    /// signed transaction can travel to its co-signers.
    pub fn serialize(&self, require_all_signatures: bool) -> Result<Vec<u8>, TransactionError> {
        let message = self.compile_message()?;
        let data = message.serialize();
        let required = message.header.num_required_signatures;

        let mut out = Vec::with_capacity(3 + usize::from(required) * SIGNATURE_LEN + data.len());
        shortvec::append_len(&mut out, u16::from(required));
        for pubkey in signer_slots(&message) {
            let signature = self
                .signatures
                .iter()
                .find(|pair| pair.pubkey == pubkey)
                .and_then(|pair| pair.signature);
            match signature {
                Some(signature) => out.extend_from_slice(signature.as_bytes()),
                None if require_all_signatures => {
                    return Err(TransactionError::Serialization(format!(
                        "missing signature for required signer {pubkey}"
                    )));
                }
                None => out.extend_from_slice(&[0u8; SIGNATURE_LEN]),
            }
        }
        out.extend_from_slice(&data);
        Ok(out)
    }

    /// Decode a wire envelope back into a transaction.
    ///
    /// All-zero signature bytes decode to an unsigned slot. Account
    /// privileges are recovered from the message header, so an account
    /// that was upgraded during compilation comes back with its merged
    /// privileges.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        let (count, consumed) = shortvec::decode_len(bytes)?;
        let sig_end = consumed + usize::from(count) * SIGNATURE_LEN;
        if bytes.len() < sig_end {
            return Err(TransactionError::Serialization(
                "truncated signature block".into(),
            ));
        }

        let message = Message::deserialize(&bytes[sig_end..])?;
        if count != u16::from(message.header.num_required_signatures) {
            return Err(TransactionError::Serialization(format!(
                "{count} signatures on the wire, header requires {}",
                message.header.num_required_signatures
            )));
        }

        let signatures = signer_slots(&message)
            .enumerate()
            .map(|(i, pubkey)| {
                let start = consumed + i * SIGNATURE_LEN;
                let raw = &bytes[start..start + SIGNATURE_LEN];
                let signature = if raw.iter().all(|&b| b == 0) {
                    None
                } else {
                    let mut arr = [0u8; SIGNATURE_LEN];
                    arr.copy_from_slice(raw);
                    Some(Signature::new(arr))
                };
                SignaturePubkeyPair { pubkey, signature }
            })
            .collect();

        let instructions = message
            .instructions
            .iter()
            .map(|ix| {
                let accounts = ix
                    .accounts
                    .iter()
                    .map(|&index| {
                        let index = usize::from(index);
                        AccountMeta {
                            pubkey: message.account_keys[index],
                            is_signer: message.is_signer(index),
                            is_writable: message.is_writable(index),
                        }
                    })
                    .collect();
                Instruction::new(
                    message.account_keys[usize::from(ix.program_id_index)],
                    accounts,
                    ix.data.clone(),
                )
            })
            .collect();

        Ok(Self {
            signatures,
            fee_payer: message.account_keys.first().copied(),
            recent_blockhash: Some(message.recent_blockhash),
            instructions,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Reject an empty signer list, returning the first signer's pubkey.
    fn require_signers(&self, signers: &[&Keypair]) -> Result<PublicKey, TransactionError> {
        match signers.first() {
            Some(keypair) => Ok(keypair.pubkey()),
            None => Err(TransactionError::Validation("no signers provided".into())),
        }
    }

    /// Align signer slots with the compiled message, carrying over any
    /// signature already collected for a still-required signer.
    fn rebuild_slots(&mut self, message: &Message) {
        if self
            .signatures
            .iter()
            .map(|pair| pair.pubkey)
            .eq(signer_slots(message))
        {
            return;
        }
        let old = std::mem::take(&mut self.signatures);
        self.signatures = signer_slots(message)
            .map(|pubkey| SignaturePubkeyPair {
                pubkey,
                signature: old
                    .iter()
                    .find(|pair| pair.pubkey == pubkey)
                    .and_then(|pair| pair.signature),
            })
            .collect();
    }

    /// Sign the message bytes into the matching slots.
    fn sign_slots(
        &mut self,
        data: &[u8],
        signers: &[&Keypair],
    ) -> Result<(), TransactionError> {
        for keypair in signers {
            let pubkey = keypair.pubkey();
            let slot = self
                .signatures
                .iter_mut()
                .find(|pair| pair.pubkey == pubkey)
                .ok_or(TransactionError::MissingSigner(pubkey))?;
            slot.signature = Some(keypair.sign_message(data));
        }
        Ok(())
    }
}

/// The required-signer prefix of the account table, in order.
fn signer_slots(message: &Message) -> impl Iterator<Item = PublicKey> + '_ {
    message
        .account_keys
        .iter()
        .take(usize::from(message.header.num_required_signatures))
        .copied()
}
