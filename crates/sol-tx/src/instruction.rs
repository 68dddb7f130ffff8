//! Program instructions and the accounts they touch.
//!
//! An instruction names its program, the accounts it will read or write
//! (with signer/writable privileges), and an opaque data payload whose
//! layout is the program's own business.

use sol_core::PublicKey;

/// One account an instruction touches, with the privileges it needs.
///
/// Privileges are requests, not facts: message compilation merges the
/// metas for the same account across instructions with a logical OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The program that interprets `data`.
    pub program_id: PublicKey,
    /// Accounts passed to the program, in the order it expects.
    pub accounts: Vec<AccountMeta>,
    /// Program-specific payload, serialized by the caller.
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: PublicKey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }
}
