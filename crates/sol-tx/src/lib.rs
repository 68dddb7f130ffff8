//! Legacy Solana transaction construction and wire encoding.
//!
//! The serialized form a node accepts is:
//!
//! ```text
//! [compact-u16 signature count][64-byte signatures...][message]
//! ```
//!
//! where the message is:
//!
//! ```text
//! [3-byte header][compact-u16 key count][32-byte keys...]
//! [32-byte recent blockhash][compact-u16 instruction count]
//! [per instruction: program id index, account indices, raw data]
//! ```
//!
//! [`Transaction`] is the builder surface: collect [`Instruction`]s, pick a
//! fee payer and blockhash, sign, serialize. [`Message`] is the compiled,
//! canonical form that signatures commit to. The [`system`] and [`token`]
//! modules build instructions for the two programs every wallet talks to.

pub mod error;
pub mod instruction;
pub mod message;
pub mod shortvec;
pub mod system;
pub mod token;
pub mod transaction;

pub use error::TransactionError;
pub use instruction::{AccountMeta, Instruction};
pub use message::{CompiledInstruction, Message, MessageHeader};
pub use transaction::{SignaturePubkeyPair, Transaction};
