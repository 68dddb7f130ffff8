//! Compact-u16 length prefixes.
//!
//! Every variable-length sequence in the wire format (signatures, account
//! keys, instructions, account indices, instruction data) is prefixed with
//! its element count in this varint form:
//!
//! - values 0..=0x7f encode in 1 byte
//! - values up to 0x3fff in 2 bytes
//! - values up to 0xffff in 3 bytes
//!
//! Each byte carries 7 value bits, least significant group first; the high
//! bit flags a continuation byte.

use crate::error::TransactionError;

/// Append the compact-u16 encoding of `value` to `buf`.
pub fn append_len(buf: &mut Vec<u8>, mut value: u16) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            return;
        }
    }
}

/// Encode `value` as a standalone compact-u16.
pub fn encode_len(value: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3);
    append_len(&mut buf, value);
    buf
}

/// Decode a compact-u16 from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. Fails on truncated
/// input, on a continuation bit in the third byte, and on an encoded value
/// that exceeds `u16::MAX`.
pub fn decode_len(bytes: &[u8]) -> Result<(u16, usize), TransactionError> {
    let mut value: u32 = 0;
    for i in 0..3 {
        let byte = *bytes
            .get(i)
            .ok_or_else(|| TransactionError::Serialization("truncated compact-u16".into()))?;
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            if value > u32::from(u16::MAX) {
                return Err(TransactionError::Serialization(
                    "compact-u16 value exceeds u16::MAX".into(),
                ));
            }
            return Ok((value as u16, i + 1));
        }
    }
    Err(TransactionError::Serialization(
        "compact-u16 continues past three bytes".into(),
    ))
}
