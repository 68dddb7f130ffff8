//! The transport seam between typed methods and the wire.

use serde_json::Value;

use crate::error::RpcError;

/// A synchronous JSON-RPC 2.0 transport.
///
/// One call maps to one request/response exchange; there is no batching,
/// no retrying, and no connection state visible at this level. `call`
/// returns the `result` member of a successful response, or an
/// [`RpcError`] carrying the node's error object.
///
/// `Send + Sync` so a [`crate::Connection`] can sit behind whatever
/// sharing the caller sets up. HTTP implementations live downstream;
/// this crate ships only the in-memory [`crate::MockTransport`].
pub trait RpcTransport: Send + Sync {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// Shared transports are transports too, so one mock or one HTTP client
/// can serve several connections (and stay inspectable from tests).
impl<T: RpcTransport + ?Sized> RpcTransport for std::sync::Arc<T> {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }
}
