//! Typed result models for the node methods [`crate::Connection`] speaks.
//!
//! Each struct mirrors one method's documented `result` shape, with serde
//! doing the validation in a single `from_value` at the dispatch boundary.
//! Fields the node added after these shapes were documented are ignored
//! rather than rejected, so a newer node does not break an older client.

use serde::Deserialize;
use sol_core::{Hash, PublicKey};

/// The `{ context, value }` wrapper most account-state methods return.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse<T> {
    pub context: RpcResponseContext,
    pub value: T,
}

/// The slot the node evaluated the request at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RpcResponseContext {
    pub slot: u64,
}

/// An on-chain account, as returned with `jsonParsed` encoding.
///
/// `data` stays JSON: its shape depends on the owning program and on
/// whether the node could parse it, which is not this crate's contract
/// to pin down.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub lamports: u64,
    pub data: serde_json::Value,
    pub owner: PublicKey,
    pub executable: bool,
    pub rent_epoch: u64,
}

/// Fee schedule attached to a blockhash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculator {
    pub lamports_per_signature: u64,
}

/// A blockhash to stamp into a transaction, plus its fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBlockhash {
    pub blockhash: Hash,
    pub fee_calculator: FeeCalculator,
}

/// A transaction the cluster has confirmed.
///
/// `transaction` and `meta` stay JSON for the same reason account data
/// does: their shapes vary with the requested encoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedTransaction {
    pub slot: u64,
    pub transaction: serde_json::Value,
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}
