//! An in-memory transport for tests.
//!
//! Responses are primed per method as FIFO queues, so a test can script a
//! sequence like "first `getRecentBlockhash`, then `sendTransaction`".
//! Every invocation is recorded, letting tests assert on the exact method
//! names and parameter shapes a [`crate::Connection`] produced.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::RpcError;
use crate::transport::RpcTransport;

/// A scriptable [`RpcTransport`] holding canned responses.
///
/// A method with no primed response answers [`RpcError::MethodNotFound`],
/// which doubles as the "test forgot to prime" signal.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `result` value for `method`.
    pub fn prime(&self, method: &str, response: Value) {
        lock(&self.responses)
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queue a transport-level failure for `method`.
    pub fn prime_error(&self, method: &str, error: RpcError) {
        lock(&self.responses)
            .entry(method.to_string())
            .or_default()
            .push_back(Err(error));
    }

    /// Every `(method, params)` pair seen so far, in call order.
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        lock(&self.log).clone()
    }
}

impl RpcTransport for MockTransport {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        lock(&self.log).push((method.to_string(), params));
        lock(&self.responses)
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(RpcError::MethodNotFound(method.to_string())))
    }
}

/// Ignore poisoning: the mock's state stays usable after a test panics.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
