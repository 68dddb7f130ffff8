//! RPC and client-level errors.
//!
//! [`RpcError`] is what a transport reports: the node said no, or said
//! something unusable. [`ClientError`] is the connection's error surface,
//! wrapping transport errors unchanged and adding the client-side
//! failures (absent accounts, ill-typed results, signing problems).

use sol_core::{CoreError, PublicKey};
use sol_tx::TransactionError;
use thiserror::Error;

/// A failure reported by the transport itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The node returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Generic { code: i64, message: String },

    /// The node does not know the method.
    #[error("rpc method not found: {0}")]
    MethodNotFound(String),

    /// The response was not a valid JSON-RPC response at all.
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

/// Any failure a [`crate::Connection`] method can surface.
///
/// Transport errors pass through unchanged; the remaining variants are
/// produced client-side. No method retries internally, so every variant
/// reaches the original caller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The node answered `null` where an account was expected.
    #[error("account not found: {0}")]
    AccountNotFound(PublicKey),

    /// The node's result did not have the shape the method promises.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_error_displays_code_and_message() {
        let err = RpcError::Generic {
            code: -32602,
            message: "invalid params".into(),
        };
        assert_eq!(err.to_string(), "rpc error -32602: invalid params");
    }

    #[test]
    fn transport_errors_display_transparently() {
        let inner = RpcError::MethodNotFound("getBalance".into());
        let outer = ClientError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }

    #[test]
    fn transaction_errors_display_transparently() {
        let inner = TransactionError::Validation("no instructions".into());
        let outer = ClientError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }

    #[test]
    fn account_not_found_names_the_pubkey() {
        let key = PublicKey::new([5u8; 32]);
        let err = ClientError::AccountNotFound(key);
        assert!(err.to_string().contains(&key.to_string()));
    }

    #[test]
    fn error_traits_are_implemented() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<RpcError>();
        assert_error::<ClientError>();
    }
}
