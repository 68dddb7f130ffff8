//! System program instructions.
//!
//! The system program owns every plain wallet account; it moves lamports
//! and creates accounts. Its instruction data starts with a little-endian
//! `u32` discriminant followed by the instruction's own fields.

use sol_core::PublicKey;

use crate::instruction::{AccountMeta, Instruction};

/// The system program: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: PublicKey = PublicKey::new([0u8; 32]);

/// `CreateAccount` discriminant.
const CREATE_ACCOUNT_INDEX: u32 = 0;

/// `Transfer` discriminant.
const TRANSFER_INDEX: u32 = 2;

/// Move `lamports` from one account to another.
///
/// The source signs and is debited; the destination only needs to be
/// writable. Data is 12 bytes: discriminant then the amount.
pub fn transfer(from: &PublicKey, to: &PublicKey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    )
}

/// Create a new account funded by `from` and owned by `owner`.
///
/// Both the funder and the new account sign: the funder authorizes the
/// debit, the new account proves possession of its key. Data is 52
/// bytes: discriminant, lamports, space, then the owner key.
pub fn create_account(
    from: &PublicKey,
    new_account: &PublicKey,
    lamports: u64,
    space: u64,
    owner: &PublicKey,
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_bytes());

    Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*new_account, true),
        ],
        data,
    )
}
