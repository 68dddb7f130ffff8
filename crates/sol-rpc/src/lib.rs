//! JSON-RPC client layer: typed Solana node methods over a pluggable
//! transport.
//!
//! [`Connection`] maps each node method to a typed request/response pair
//! and validates the JSON result once, at the boundary. The HTTP (or
//! whatever else) plumbing lives behind the [`RpcTransport`] trait, which
//! callers construct and hand in explicitly; [`MockTransport`] is the
//! in-memory implementation the tests run against, public so downstream
//! code can test against it too.
//!
//! Everything is synchronous and blocking, one request per call. There
//! are no retries and no caching; every failure surfaces to the caller of
//! the operation that hit it.

pub mod cluster;
pub mod connection;
pub mod error;
pub mod mock;
pub mod response;
pub mod transport;

pub use cluster::{Cluster, Commitment};
pub use connection::{Connection, SentTransaction};
pub use error::{ClientError, RpcError};
pub use mock::MockTransport;
pub use response::{
    Account, ConfirmedTransaction, FeeCalculator, RecentBlockhash, RpcResponse,
    RpcResponseContext,
};
pub use transport::RpcTransport;
