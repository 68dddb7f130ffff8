//! SPL Token program instructions and associated token accounts.
//!
//! Token balances live in token accounts owned by the SPL Token program.
//! The canonical token account for a (wallet, mint) pair is a PDA of the
//! associated token account program, so any party can compute it without
//! asking the chain.

use sol_core::{CoreError, PublicKey};

use crate::instruction::{AccountMeta, Instruction};

/// The SPL Token program.
/// Base58: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: PublicKey = PublicKey::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// The associated token account program.
/// Base58: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: PublicKey = PublicKey::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// SPL Token `Transfer` discriminant (a single byte, unlike the system
/// program's u32).
const TRANSFER_INDEX: u8 = 3;

/// Move `amount` base units between two token accounts of the same mint.
///
/// `owner` is the wallet that owns `source` and must sign; the token
/// accounts themselves never sign. Data is 9 bytes: discriminant then
/// the amount.
pub fn transfer(
    source: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(TRANSFER_INDEX);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    )
}

/// The canonical token account for a wallet and mint.
///
/// PDA of the associated token program over
/// `[wallet, TOKEN_PROGRAM_ID, mint]`.
pub fn associated_token_address(
    wallet: &PublicKey,
    mint: &PublicKey,
) -> Result<PublicKey, CoreError> {
    let (address, _bump) = PublicKey::find_program_address(
        &[
            wallet.as_bytes(),
            TOKEN_PROGRAM_ID.as_bytes(),
            mint.as_bytes(),
        ],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )?;
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// USDC, used as a realistic mint fixture.
    fn usdc() -> PublicKey {
        "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
            .parse()
            .unwrap()
    }

    // -- program ids --------------------------------------------------------

    #[test]
    fn token_program_id_roundtrip() {
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn associated_token_program_id_roundtrip() {
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
    }

    // -- transfer -----------------------------------------------------------

    #[test]
    fn transfer_data_is_9_bytes() {
        let ix = transfer(
            &PublicKey::new([1u8; 32]),
            &PublicKey::new([2u8; 32]),
            &PublicKey::new([3u8; 32]),
            1,
        );
        assert_eq!(ix.data.len(), 9);
    }

    #[test]
    fn transfer_data_encoding() {
        let ix = transfer(
            &PublicKey::new([1u8; 32]),
            &PublicKey::new([2u8; 32]),
            &PublicKey::new([3u8; 32]),
            123_456,
        );
        assert_eq!(ix.data[0], 3);
        assert_eq!(&ix.data[1..], &123_456u64.to_le_bytes());
    }

    #[test]
    fn transfer_account_roles() {
        let source = PublicKey::new([1u8; 32]);
        let destination = PublicKey::new([2u8; 32]);
        let owner = PublicKey::new([3u8; 32]);
        let ix = transfer(&source, &destination, &owner, 1);

        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
        assert_eq!(ix.accounts[2].pubkey, owner);
    }

    #[test]
    fn transfer_uses_the_token_program() {
        let ix = transfer(
            &PublicKey::new([1u8; 32]),
            &PublicKey::new([2u8; 32]),
            &PublicKey::new([3u8; 32]),
            1,
        );
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
    }

    // -- associated token addresses -----------------------------------------

    #[test]
    fn ata_derivation_is_deterministic() {
        let wallet = PublicKey::new([7u8; 32]);
        let a = associated_token_address(&wallet, &usdc()).unwrap();
        let b = associated_token_address(&wallet, &usdc()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ata_is_not_on_curve() {
        let wallet = PublicKey::new([7u8; 32]);
        let ata = associated_token_address(&wallet, &usdc()).unwrap();
        assert!(!ata.is_on_curve());
    }

    #[test]
    fn different_wallets_give_different_atas() {
        let a = associated_token_address(&PublicKey::new([1u8; 32]), &usdc()).unwrap();
        let b = associated_token_address(&PublicKey::new([2u8; 32]), &usdc()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn different_mints_give_different_atas() {
        let wallet = PublicKey::new([7u8; 32]);
        let a = associated_token_address(&wallet, &usdc()).unwrap();
        let b = associated_token_address(&wallet, &PublicKey::new([0x11u8; 32])).unwrap();
        assert_ne!(a, b);
    }
}
