//! The compiled message: the exact bytes signatures commit to.
//!
//! Compilation flattens a list of [`Instruction`]s into a single ordered
//! account table plus index-based instructions. The table order is what the
//! runtime keys privileges off, so it is load-bearing:
//!
//! 1. fee payer (always a writable signer, always index 0)
//! 2. remaining writable signers
//! 3. read-only signers
//! 4. writable non-signers
//! 5. read-only non-signers (program ids land here)
//!
//! Within each group accounts keep first-seen order. An account referenced
//! by several instructions appears once, with the union of the privileges
//! asked for it.

use sol_core::{Hash, PublicKey, HASH_LEN, PUBKEY_LEN};

use crate::error::TransactionError;
use crate::instruction::{AccountMeta, Instruction};
use crate::shortvec;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The three privilege counters at the front of every message.
///
/// Together with the account table order they encode, per account index:
/// signer iff `index < num_required_signatures`, writable per the two
/// read-only counters. See [`Message::is_writable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Signatures the transaction must carry, and the length of the
    /// signer prefix of the account table.
    pub num_required_signatures: u8,
    /// Trailing accounts of the signer prefix that are read-only.
    pub num_readonly_signed_accounts: u8,
    /// Trailing accounts of the whole table that are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its accounts resolved to table indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    /// Index of the program id in the account table.
    pub program_id_index: u8,
    /// Indices of the instruction's accounts, in program order.
    pub accounts: Vec<u8>,
    /// Program-specific payload, unchanged from the source instruction.
    pub data: Vec<u8>,
}

/// A fully compiled transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Sort rank for the privilege groups. `sort_by_key` is stable, so
/// first-seen order survives within each group.
fn privilege_rank(meta: &AccountMeta) -> u8 {
    match (meta.is_signer, meta.is_writable) {
        (true, true) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    }
}

impl Message {
    /// Compile instructions into a message.
    ///
    /// The fee payer is upserted at the front as a writable signer before
    /// any instruction accounts are collected, which pins it to index 0.
    pub fn compile(
        fee_payer: &PublicKey,
        instructions: &[Instruction],
        recent_blockhash: &Hash,
    ) -> Result<Self, TransactionError> {
        if instructions.is_empty() {
            return Err(TransactionError::Validation(
                "a transaction needs at least one instruction".into(),
            ));
        }
        for ix in instructions {
            if ix.data.len() > usize::from(u16::MAX) {
                return Err(TransactionError::Validation(format!(
                    "instruction data of {} bytes exceeds the u16 length prefix",
                    ix.data.len()
                )));
            }
            if ix.accounts.len() > usize::from(u16::MAX) {
                return Err(TransactionError::Validation(format!(
                    "instruction references {} accounts, more than the u16 length prefix",
                    ix.accounts.len()
                )));
            }
        }

        // Collect every account the message touches: fee payer first, then
        // instruction accounts in order, then program ids.
        let mut metas: Vec<AccountMeta> = Vec::new();
        upsert(&mut metas, AccountMeta::new(*fee_payer, true));
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(&mut metas, *meta);
            }
        }
        for ix in instructions {
            upsert(&mut metas, AccountMeta::new_readonly(ix.program_id, false));
        }

        metas.sort_by_key(privilege_rank);

        if metas.len() > 256 {
            return Err(TransactionError::Validation(format!(
                "{} accounts exceed the 256-entry table an u8 index can address",
                metas.len()
            )));
        }

        let mut required = 0usize;
        let mut readonly_signed = 0usize;
        let mut readonly_unsigned = 0usize;
        for meta in &metas {
            if meta.is_signer {
                required += 1;
                if !meta.is_writable {
                    readonly_signed += 1;
                }
            } else if !meta.is_writable {
                readonly_unsigned += 1;
            }
        }
        if required > usize::from(u8::MAX) {
            return Err(TransactionError::Validation(format!(
                "{required} required signers exceed the u8 header counter"
            )));
        }
        let header = MessageHeader {
            num_required_signatures: required as u8,
            num_readonly_signed_accounts: readonly_signed as u8,
            num_readonly_unsigned_accounts: readonly_unsigned as u8,
        };

        let account_keys: Vec<PublicKey> = metas.iter().map(|meta| meta.pubkey).collect();
        let index_of = |key: &PublicKey| -> u8 {
            // Present by construction: every key was upserted above.
            account_keys.iter().position(|k| k == key).unwrap_or(0) as u8
        };

        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|meta| index_of(&meta.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash: *recent_blockhash,
            instructions,
        })
    }

    /// Whether the account at `index` must sign.
    pub fn is_signer(&self, index: usize) -> bool {
        index < usize::from(self.header.num_required_signatures)
    }

    /// Whether the account at `index` may be written.
    pub fn is_writable(&self, index: usize) -> bool {
        let signers = usize::from(self.header.num_required_signatures);
        if index < signers {
            index < signers.saturating_sub(usize::from(self.header.num_readonly_signed_accounts))
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(usize::from(self.header.num_readonly_unsigned_accounts))
        }
    }

    // -----------------------------------------------------------------------
    // Wire encoding
    // -----------------------------------------------------------------------

    /// Serialize to the signable byte form.
    ///
    /// Infallible: compilation already bounds every count, and hand-built
    /// messages are trusted the same way hand-built keys are.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            3 + 3
                + self.account_keys.len() * PUBKEY_LEN
                + HASH_LEN
                + self
                    .instructions
                    .iter()
                    .map(|ix| 8 + ix.accounts.len() + ix.data.len())
                    .sum::<usize>(),
        );

        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        shortvec::append_len(&mut out, self.account_keys.len() as u16);
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        shortvec::append_len(&mut out, self.instructions.len() as u16);
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            shortvec::append_len(&mut out, ix.accounts.len() as u16);
            out.extend_from_slice(&ix.accounts);
            shortvec::append_len(&mut out, ix.data.len() as u16);
            out.extend_from_slice(&ix.data);
        }

        out
    }

    /// Parse a message, consuming the whole input.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut pos = 0usize;

        let header_bytes = take(bytes, &mut pos, 3, "message header")?;
        let header = MessageHeader {
            num_required_signatures: header_bytes[0],
            num_readonly_signed_accounts: header_bytes[1],
            num_readonly_unsigned_accounts: header_bytes[2],
        };

        let key_count = read_len(bytes, &mut pos)?;
        let mut account_keys = Vec::with_capacity(usize::from(key_count));
        for _ in 0..key_count {
            let raw = take(bytes, &mut pos, PUBKEY_LEN, "account key")?;
            let mut key = [0u8; PUBKEY_LEN];
            key.copy_from_slice(raw);
            account_keys.push(PublicKey::new(key));
        }

        let signers = usize::from(header.num_required_signatures);
        if signers > account_keys.len()
            || usize::from(header.num_readonly_signed_accounts) > signers
            || usize::from(header.num_readonly_unsigned_accounts)
                > account_keys.len() - signers
        {
            return Err(TransactionError::Serialization(
                "header counts exceed the account table".into(),
            ));
        }

        let raw = take(bytes, &mut pos, HASH_LEN, "recent blockhash")?;
        let mut blockhash = [0u8; HASH_LEN];
        blockhash.copy_from_slice(raw);

        let ix_count = read_len(bytes, &mut pos)?;
        let mut instructions = Vec::with_capacity(usize::from(ix_count));
        for _ in 0..ix_count {
            let program_id_index = take(bytes, &mut pos, 1, "program id index")?[0];
            if usize::from(program_id_index) >= account_keys.len() {
                return Err(TransactionError::Serialization(
                    "program id index out of range".into(),
                ));
            }

            let account_count = read_len(bytes, &mut pos)?;
            let indices = take(bytes, &mut pos, usize::from(account_count), "account indices")?;
            if let Some(&bad) = indices
                .iter()
                .find(|&&i| usize::from(i) >= account_keys.len())
            {
                return Err(TransactionError::Serialization(format!(
                    "account index {bad} out of range"
                )));
            }
            let accounts = indices.to_vec();

            let data_len = read_len(bytes, &mut pos)?;
            let data = take(bytes, &mut pos, usize::from(data_len), "instruction data")?.to_vec();

            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        if pos != bytes.len() {
            return Err(TransactionError::Serialization(format!(
                "{} trailing bytes after message",
                bytes.len() - pos
            )));
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash: Hash::new(blockhash),
            instructions,
        })
    }
}

/// Merge a meta into the table: first occurrence wins the slot, privileges
/// accumulate with OR.
fn upsert(metas: &mut Vec<AccountMeta>, meta: AccountMeta) {
    match metas.iter_mut().find(|existing| existing.pubkey == meta.pubkey) {
        Some(existing) => {
            existing.is_signer |= meta.is_signer;
            existing.is_writable |= meta.is_writable;
        }
        None => metas.push(meta),
    }
}

/// Slice `count` bytes at the cursor, advancing it.
fn take<'a>(
    bytes: &'a [u8],
    pos: &mut usize,
    count: usize,
    what: &str,
) -> Result<&'a [u8], TransactionError> {
    let end = pos
        .checked_add(count)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| TransactionError::Serialization(format!("truncated {what}")))?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}

/// Decode a compact-u16 at the cursor, advancing it.
fn read_len(bytes: &[u8], pos: &mut usize) -> Result<u16, TransactionError> {
    let (value, consumed) = shortvec::decode_len(&bytes[*pos..])?;
    *pos += consumed;
    Ok(value)
}
