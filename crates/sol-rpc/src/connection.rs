//! Typed node methods over a transport.
//!
//! Each method builds the positional JSON params the node expects, makes
//! exactly one transport call, and validates the `result` into its typed
//! shape in one place. Nothing here retries, caches, or mutates caller
//! state: [`Connection::send_transaction`] returns a new signed
//! transaction value rather than touching the one it was given.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sol_core::{Keypair, PublicKey, Signature};
use sol_tx::Transaction;

use crate::cluster::Commitment;
use crate::error::ClientError;
use crate::response::{Account, ConfirmedTransaction, RecentBlockhash, RpcResponse};
use crate::transport::RpcTransport;

/// A client bound to one node via an explicit transport.
pub struct Connection {
    transport: Box<dyn RpcTransport>,
}

/// The outcome of [`Connection::send_transaction`]: the signature the node
/// acknowledged plus the signed transaction that was actually submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub signature: Signature,
    pub transaction: Transaction,
}

impl Connection {
    pub fn new(transport: impl RpcTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Account state for `pubkey`, with `jsonParsed` encoding.
    ///
    /// A `null` value from the node means the account does not exist and
    /// surfaces as [`ClientError::AccountNotFound`].
    pub fn get_account_info(&self, pubkey: &PublicKey) -> Result<Account, ClientError> {
        let result = self.call(
            "getAccountInfo",
            vec![json!(pubkey.to_string()), json!({ "encoding": "jsonParsed" })],
        )?;
        let response: RpcResponse<Option<Account>> = typed("getAccountInfo", result)?;
        response.value.ok_or(ClientError::AccountNotFound(*pubkey))
    }

    /// Balance of `pubkey` in lamports. A missing or empty account is a
    /// plain zero, never an error.
    pub fn get_balance(&self, pubkey: &PublicKey) -> Result<u64, ClientError> {
        let result = self.call("getBalance", vec![json!(pubkey.to_string())])?;
        let response: RpcResponse<u64> = typed("getBalance", result)?;
        Ok(response.value)
    }

    /// A confirmed transaction by signature, `None` when the cluster does
    /// not know it (expired or never landed).
    pub fn get_confirmed_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<ConfirmedTransaction>, ClientError> {
        let result = self.call("getConfirmedTransaction", vec![json!(signature.to_string())])?;
        typed("getConfirmedTransaction", result)
    }

    /// Same contract as [`Connection::get_confirmed_transaction`] through
    /// the method name newer nodes serve.
    pub fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<ConfirmedTransaction>, ClientError> {
        let result = self.call("getTransaction", vec![json!(signature.to_string())])?;
        typed("getTransaction", result)
    }

    /// Account state for each of `pubkeys`, with `None` holding the place
    /// of accounts that do not exist.
    pub fn get_multiple_accounts(
        &self,
        pubkeys: &[PublicKey],
    ) -> Result<Vec<Option<Account>>, ClientError> {
        let keys: Vec<String> = pubkeys.iter().map(PublicKey::to_string).collect();
        let result = self.call(
            "getMultipleAccounts",
            vec![json!(keys), json!({ "encoding": "jsonParsed" })],
        )?;
        let response: RpcResponse<Vec<Option<Account>>> = typed("getMultipleAccounts", result)?;
        Ok(response.value)
    }

    /// A blockhash to stamp into a transaction, at the node's default
    /// commitment unless one is given.
    pub fn get_recent_blockhash(
        &self,
        commitment: Option<Commitment>,
    ) -> Result<RecentBlockhash, ClientError> {
        let params = match commitment {
            Some(commitment) => vec![json!({ "commitment": commitment })],
            None => vec![],
        };
        let result = self.call("getRecentBlockhash", params)?;
        let response: RpcResponse<RecentBlockhash> = typed("getRecentBlockhash", result)?;
        Ok(response.value)
    }

    /// Ask the faucet (test clusters only) to credit `lamports`. The
    /// returned signature can be polled via the transaction getters.
    pub fn request_airdrop(
        &self,
        pubkey: &PublicKey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        let result = self.call(
            "requestAirdrop",
            vec![json!(pubkey.to_string()), json!(lamports)],
        )?;
        typed("requestAirdrop", result)
    }

    /// Sign and submit a transaction, leaving the caller's value untouched.
    ///
    /// Works on a clone: fetches a recent blockhash if the transaction has
    /// none, signs with `signers`, serializes, and submits base64-encoded
    /// with `preflightCommitment: confirmed`. Serialization deliberately
    /// skips the all-signatures check, so a partially signed transaction
    /// goes out as-is and the node's signature verification is the gate.
    ///
    /// Returns the node-acknowledged signature together with the signed
    /// transaction that was submitted.
    pub fn send_transaction(
        &self,
        transaction: &Transaction,
        signers: &[&Keypair],
    ) -> Result<SentTransaction, ClientError> {
        let mut transaction = transaction.clone();
        if transaction.recent_blockhash.is_none() {
            transaction.recent_blockhash = Some(self.get_recent_blockhash(None)?.blockhash);
        }
        transaction.sign(signers)?;

        let wire = transaction.serialize(false)?;
        let encoded = STANDARD.encode(&wire);
        let result = self.call(
            "sendTransaction",
            vec![
                json!(encoded),
                json!({ "encoding": "base64", "preflightCommitment": "confirmed" }),
            ],
        )?;
        let signature: Signature = typed("sendTransaction", result)?;

        Ok(SentTransaction {
            signature,
            transaction,
        })
    }

    /// One transport exchange.
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ClientError> {
        tracing::debug!(method = %method, "Dispatching RPC request");
        let result = self.transport.call(method, params)?;
        tracing::trace!(method = %method, "RPC result received");
        Ok(result)
    }
}

/// Validate a raw `result` into the method's typed shape.
fn typed<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::MalformedResponse(format!("{method}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sol_core::Hash;
    use sol_tx::{system, TransactionError};

    use crate::error::RpcError;
    use crate::mock::MockTransport;

    const BLOCKHASH: &str = "GH7ome3EiwEr7tu9JuTh2dpYWBJK3z69Xm1ZE3MEE6JC";

    fn setup() -> (Arc<MockTransport>, Connection) {
        let mock = Arc::new(MockTransport::new());
        let connection = Connection::new(Arc::clone(&mock));
        (mock, connection)
    }

    fn wrapped(value: Value) -> Value {
        json!({ "context": { "slot": 123u64 }, "value": value })
    }

    fn account_json() -> Value {
        json!({
            "lamports": 2_039_280u64,
            "data": { "program": "spl-token", "parsed": {}, "space": 165 },
            "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "executable": false,
            "rentEpoch": 361u64
        })
    }

    fn blockhash_json() -> Value {
        wrapped(json!({
            "blockhash": BLOCKHASH,
            "feeCalculator": { "lamportsPerSignature": 5000u64 }
        }))
    }

    // -- balances -----------------------------------------------------------

    #[test]
    fn get_balance_unwraps_the_value() {
        let (mock, connection) = setup();
        mock.prime("getBalance", wrapped(json!(5_000_000u64)));

        let key = PublicKey::new([1u8; 32]);
        assert_eq!(connection.get_balance(&key).unwrap(), 5_000_000);

        let requests = mock.requests();
        assert_eq!(requests[0].0, "getBalance");
        assert_eq!(requests[0].1, vec![json!(key.to_string())]);
    }

    #[test]
    fn zero_balance_is_ok_not_an_error() {
        let (mock, connection) = setup();
        mock.prime("getBalance", wrapped(json!(0u64)));
        assert_eq!(connection.get_balance(&PublicKey::new([1u8; 32])).unwrap(), 0);
    }

    // -- account info -------------------------------------------------------

    #[test]
    fn get_account_info_requests_json_parsed_encoding() {
        let (mock, connection) = setup();
        mock.prime("getAccountInfo", wrapped(account_json()));

        let key = PublicKey::new([2u8; 32]);
        connection.get_account_info(&key).unwrap();

        let requests = mock.requests();
        assert_eq!(
            requests[0].1,
            vec![json!(key.to_string()), json!({ "encoding": "jsonParsed" })]
        );
    }

    #[test]
    fn get_account_info_parses_the_account() {
        let (mock, connection) = setup();
        mock.prime("getAccountInfo", wrapped(account_json()));

        let account = connection
            .get_account_info(&PublicKey::new([2u8; 32]))
            .unwrap();
        assert_eq!(account.lamports, 2_039_280);
        assert_eq!(
            account.owner.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn a_null_account_is_account_not_found() {
        let (mock, connection) = setup();
        mock.prime("getAccountInfo", wrapped(Value::Null));

        let key = PublicKey::new([3u8; 32]);
        let err = connection.get_account_info(&key).unwrap_err();
        match err {
            ClientError::AccountNotFound(missing) => assert_eq!(missing, key),
            other => panic!("expected AccountNotFound, got {other}"),
        }
    }

    #[test]
    fn get_multiple_accounts_keeps_null_slots() {
        let (mock, connection) = setup();
        mock.prime(
            "getMultipleAccounts",
            wrapped(json!([account_json(), Value::Null])),
        );

        let keys = [PublicKey::new([1u8; 32]), PublicKey::new([2u8; 32])];
        let accounts = connection.get_multiple_accounts(&keys).unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].is_some());
        assert!(accounts[1].is_none());

        let requests = mock.requests();
        assert_eq!(
            requests[0].1[0],
            json!([keys[0].to_string(), keys[1].to_string()])
        );
        assert_eq!(requests[0].1[1], json!({ "encoding": "jsonParsed" }));
    }

    // -- blockhashes --------------------------------------------------------

    #[test]
    fn get_recent_blockhash_omits_commitment_by_default() {
        let (mock, connection) = setup();
        mock.prime("getRecentBlockhash", blockhash_json());

        let recent = connection.get_recent_blockhash(None).unwrap();
        assert_eq!(recent.blockhash.to_string(), BLOCKHASH);
        assert_eq!(recent.fee_calculator.lamports_per_signature, 5000);
        assert!(mock.requests()[0].1.is_empty());
    }

    #[test]
    fn get_recent_blockhash_passes_commitment_as_an_object() {
        let (mock, connection) = setup();
        mock.prime("getRecentBlockhash", blockhash_json());

        connection
            .get_recent_blockhash(Some(Commitment::Finalized))
            .unwrap();
        assert_eq!(
            mock.requests()[0].1,
            vec![json!({ "commitment": "finalized" })]
        );
    }

    // -- transactions by signature ------------------------------------------

    #[test]
    fn get_transaction_parses_the_result() {
        let (mock, connection) = setup();
        mock.prime(
            "getTransaction",
            json!({
                "slot": 430u64,
                "transaction": { "signatures": [] },
                "meta": { "fee": 5000u64 },
                "blockTime": 1_690_000_000i64
            }),
        );

        let signature = Keypair::from_seed(&[1u8; 32]).sign_message(b"x");
        let tx = connection.get_transaction(&signature).unwrap().unwrap();
        assert_eq!(tx.slot, 430);
        assert_eq!(
            mock.requests()[0].1,
            vec![json!(signature.to_string())]
        );
    }

    #[test]
    fn an_unknown_transaction_is_none() {
        let (mock, connection) = setup();
        mock.prime("getConfirmedTransaction", Value::Null);

        let signature = Keypair::from_seed(&[1u8; 32]).sign_message(b"x");
        assert!(connection
            .get_confirmed_transaction(&signature)
            .unwrap()
            .is_none());
    }

    // -- airdrops -----------------------------------------------------------

    #[test]
    fn request_airdrop_returns_the_node_signature() {
        let (mock, connection) = setup();
        let echoed = Keypair::from_seed(&[7u8; 32]).sign_message(b"faucet");
        mock.prime("requestAirdrop", json!(echoed.to_string()));

        let key = PublicKey::new([4u8; 32]);
        let signature = connection.request_airdrop(&key, 1_000_000_000).unwrap();
        assert_eq!(signature, echoed);
        assert_eq!(
            mock.requests()[0].1,
            vec![json!(key.to_string()), json!(1_000_000_000u64)]
        );
    }

    #[test]
    fn an_unparseable_airdrop_signature_is_malformed_response() {
        let (mock, connection) = setup();
        mock.prime("requestAirdrop", json!("not a signature"));

        let err = connection
            .request_airdrop(&PublicKey::new([4u8; 32]), 1)
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    // -- error passthrough --------------------------------------------------

    #[test]
    fn transport_errors_pass_through_unchanged() {
        let (mock, connection) = setup();
        mock.prime_error(
            "getBalance",
            RpcError::Generic {
                code: -32005,
                message: "node is behind".into(),
            },
        );

        let err = connection
            .get_balance(&PublicKey::new([1u8; 32]))
            .unwrap_err();
        match err {
            ClientError::Rpc(RpcError::Generic { code, message }) => {
                assert_eq!(code, -32005);
                assert_eq!(message, "node is behind");
            }
            other => panic!("expected the generic rpc error, got {other}"),
        }
    }

    #[test]
    fn an_unprimed_method_surfaces_method_not_found() {
        let (_mock, connection) = setup();
        let err = connection
            .get_balance(&PublicKey::new([1u8; 32]))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rpc(RpcError::MethodNotFound(_))
        ));
    }

    #[test]
    fn an_ill_typed_result_is_malformed_response() {
        let (mock, connection) = setup();
        mock.prime("getBalance", wrapped(json!("five lamports")));

        let err = connection
            .get_balance(&PublicKey::new([1u8; 32]))
            .unwrap_err();
        match err {
            ClientError::MalformedResponse(context) => {
                assert!(context.starts_with("getBalance"));
            }
            other => panic!("expected MalformedResponse, got {other}"),
        }
    }

    // -- sending transactions -----------------------------------------------

    fn transfer_to_send(payer: &Keypair) -> Transaction {
        let mut tx = Transaction::new();
        tx.add(system::transfer(
            &payer.pubkey(),
            &PublicKey::new([9u8; 32]),
            12_345,
        ));
        tx
    }

    /// The signature this exact transaction will carry once signed with
    /// the fetched blockhash; Ed25519 determinism makes it predictable.
    fn expected_signature(payer: &Keypair) -> Signature {
        let mut tx = transfer_to_send(payer);
        tx.recent_blockhash = Some(BLOCKHASH.parse::<Hash>().unwrap());
        tx.sign(&[payer]).unwrap();
        tx.signature().unwrap()
    }

    #[test]
    fn send_fetches_a_blockhash_when_the_transaction_has_none() {
        let (mock, connection) = setup();
        let payer = Keypair::from_seed(&[1u8; 32]);
        mock.prime("getRecentBlockhash", blockhash_json());
        mock.prime(
            "sendTransaction",
            json!(expected_signature(&payer).to_string()),
        );

        let tx = transfer_to_send(&payer);
        connection.send_transaction(&tx, &[&payer]).unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, "getRecentBlockhash");
        assert_eq!(requests[1].0, "sendTransaction");
    }

    #[test]
    fn send_keeps_a_preset_blockhash() {
        let (mock, connection) = setup();
        let payer = Keypair::from_seed(&[1u8; 32]);
        mock.prime(
            "sendTransaction",
            json!(expected_signature(&payer).to_string()),
        );

        let mut tx = transfer_to_send(&payer);
        tx.recent_blockhash = Some(BLOCKHASH.parse::<Hash>().unwrap());
        connection.send_transaction(&tx, &[&payer]).unwrap();

        // No blockhash fetch happened.
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn send_submits_base64_with_confirmed_preflight() {
        let (mock, connection) = setup();
        let payer = Keypair::from_seed(&[1u8; 32]);
        mock.prime("getRecentBlockhash", blockhash_json());
        mock.prime(
            "sendTransaction",
            json!(expected_signature(&payer).to_string()),
        );

        let tx = transfer_to_send(&payer);
        connection.send_transaction(&tx, &[&payer]).unwrap();

        let requests = mock.requests();
        let params = &requests[1].1;
        assert_eq!(
            params[1],
            json!({ "encoding": "base64", "preflightCommitment": "confirmed" })
        );

        let encoded = params[0].as_str().unwrap();
        let wire = STANDARD.decode(encoded).unwrap();
        // One signature, then 64 signature bytes, then the message.
        assert_eq!(wire[0], 1);
        assert_eq!(
            &wire[1..65],
            expected_signature(&payer).as_bytes()
        );
    }

    #[test]
    fn send_returns_the_signed_transaction_and_leaves_the_input_alone() {
        let (mock, connection) = setup();
        let payer = Keypair::from_seed(&[1u8; 32]);
        mock.prime("getRecentBlockhash", blockhash_json());
        mock.prime(
            "sendTransaction",
            json!(expected_signature(&payer).to_string()),
        );

        let tx = transfer_to_send(&payer);
        let sent = connection.send_transaction(&tx, &[&payer]).unwrap();

        // The caller's value is untouched.
        assert!(tx.recent_blockhash.is_none());
        assert!(tx.signatures.is_empty());

        // The returned value is fully signed and acknowledged.
        assert_eq!(sent.signature, expected_signature(&payer));
        assert_eq!(sent.transaction.signature(), Some(sent.signature));
        assert!(sent.transaction.verify_signatures().unwrap());
    }

    #[test]
    fn send_surfaces_signing_failures_before_any_submission() {
        let (mock, connection) = setup();
        let payer = Keypair::from_seed(&[1u8; 32]);
        let stranger = Keypair::from_seed(&[8u8; 32]);

        let mut tx = transfer_to_send(&payer);
        tx.fee_payer = Some(payer.pubkey());
        tx.recent_blockhash = Some(BLOCKHASH.parse::<Hash>().unwrap());

        let err = connection.send_transaction(&tx, &[&stranger]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transaction(TransactionError::MissingSigner(_))
        ));
        assert!(mock.requests().is_empty());
    }
}
