// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger node client.
//!
//! [`LedgerClient`] is the boundary to the remote node: submit a signed call,
//! wait for its receipt, perform a read-only call. [`RpcLedgerClient`] is the
//! JSON-RPC implementation backed by alloy.
//!
//! The underlying connection is shared by every in-flight request and never
//! mutated. Signing is expressed by layering a wallet over a clone of that
//! connection for the duration of one submission.
//!
//! Operator submissions take their nonce from the node's pending count and
//! are serialized from nonce lookup until the node accepts the transaction.
//! A call rejected before broadcast therefore never consumes a nonce.

use std::time::Duration;

use alloy::{
    eips::BlockId,
    network::EthereumWallet,
    primitives::TxHash,
    providers::{DynProvider, Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::TransportError,
};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::contract::ContractBinding;
use super::signing::SigningIdentity;
use super::types::{LedgerCall, PendingTx, TxReceipt};

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Unknown contract method: {0}")]
    UnknownMethod(String),

    #[error("Invalid call arguments: {0}")]
    Encoding(String),

    #[error("Failed to decode call result: {0}")]
    Decoding(String),

    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    RpcError(String),
}

impl LedgerError {
    /// Classify a node error, surfacing the revert reason when present.
    fn from_rpc(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => {
                let decoded = payload
                    .as_revert_data()
                    .and_then(|data| alloy::sol_types::decode_revert_reason(&data));
                match decoded {
                    Some(reason) => LedgerError::Reverted(revert_reason(&reason)),
                    None if payload.message.contains("revert") => {
                        LedgerError::Reverted(revert_reason(&payload.message))
                    }
                    None => LedgerError::RpcError(err.to_string()),
                }
            }
            None => LedgerError::RpcError(err.to_string()),
        }
    }
}

/// Strip the node's `execution reverted` / `revert` framing from a reason.
fn revert_reason(raw: &str) -> String {
    let mut reason = raw.trim();
    for prefix in ["execution reverted", "revert"] {
        if let Some(rest) = reason.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with(':') || rest.starts_with(' ') {
                reason = rest.trim_start_matches(':').trim();
            }
        }
    }
    if reason.is_empty() {
        "no reason given".to_string()
    } else {
        reason.to_string()
    }
}

/// Primitives the relay needs from the ledger node.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign `call` with `identity` and hand it to the node.
    async fn submit(
        &self,
        call: &LedgerCall,
        identity: &SigningIdentity,
    ) -> Result<PendingTx, LedgerError>;

    /// Block until the node reports a receipt for `pending`.
    ///
    /// This waits without bound; callers apply their own timeout.
    async fn wait_for_receipt(
        &self,
        call: &LedgerCall,
        pending: &PendingTx,
    ) -> Result<TxReceipt, LedgerError>;

    /// Execute a read-only call and return its decoded result.
    async fn read(&self, call: &LedgerCall) -> Result<Value, LedgerError>;

    /// Get the current block number.
    async fn block_number(&self) -> Result<u64, LedgerError>;
}

/// JSON-RPC ledger client for the deployed loan contract.
pub struct RpcLedgerClient {
    /// Shared read-only connection
    provider: RootProvider,
    /// Operator wallet layered over `provider`
    operator: DynProvider,
    /// Held from nonce lookup until the node accepts an operator transaction
    operator_send: Mutex<()>,
    contract: ContractBinding,
    poll_interval: Duration,
}

impl RpcLedgerClient {
    pub fn connect(
        rpc_url: &str,
        contract: ContractBinding,
        operator: &PrivateKeySigner,
        poll_interval: Duration,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let provider = RootProvider::new_http(url);
        let operator = ProviderBuilder::new()
            .disable_recommended_fillers()
            .with_gas_estimation()
            .with_simple_nonce_management()
            .fetch_chain_id()
            .wallet(EthereumWallet::from(operator.clone()))
            .connect_provider(provider.clone())
            .erased();

        Ok(Self {
            provider,
            operator,
            operator_send: Mutex::new(()),
            contract,
            poll_interval,
        })
    }

    pub fn contract(&self) -> &ContractBinding {
        &self.contract
    }

    /// Re-run a failed call against the parent block to recover the revert reason.
    async fn replay_revert_reason(
        &self,
        call: &LedgerCall,
        pending: &PendingTx,
        block_number: u64,
    ) -> Option<String> {
        let tx = self.contract.transaction(call).ok()?.from(pending.from);
        let block = BlockId::number(block_number.saturating_sub(1));
        match self.provider.call(tx).block(block).await {
            Ok(_) => None,
            Err(e) => match LedgerError::from_rpc(e) {
                LedgerError::Reverted(reason) => Some(reason),
                _ => None,
            },
        }
    }
}

async fn send_with<P: Provider>(
    provider: &P,
    tx: TransactionRequest,
) -> Result<TxHash, LedgerError> {
    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(LedgerError::from_rpc)?;
    Ok(*pending.tx_hash())
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit(
        &self,
        call: &LedgerCall,
        identity: &SigningIdentity,
    ) -> Result<PendingTx, LedgerError> {
        let from = identity.address();
        let tx = self.contract.transaction(call)?.from(from);

        let tx_hash = match identity {
            SigningIdentity::Operator(_) => {
                let _guard = self.operator_send.lock().await;
                send_with(&self.operator, tx).await?
            }
            SigningIdentity::Caller(signer) => {
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer.clone()))
                    .connect_provider(self.provider.clone());
                send_with(&provider, tx).await?
            }
        };

        Ok(PendingTx { tx_hash, from })
    }

    async fn wait_for_receipt(
        &self,
        call: &LedgerCall,
        pending: &PendingTx,
    ) -> Result<TxReceipt, LedgerError> {
        loop {
            match self.provider.get_transaction_receipt(pending.tx_hash).await {
                Ok(Some(receipt)) => {
                    let block_number = receipt.block_number.unwrap_or(0);
                    let success = receipt.status();
                    let revert_reason = if success {
                        None
                    } else {
                        self.replay_revert_reason(call, pending, block_number).await
                    };
                    return Ok(TxReceipt {
                        tx_hash: pending.tx_hash,
                        block_number,
                        gas_used: receipt.gas_used as u64,
                        success,
                        revert_reason,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        tx_hash = %pending.tx_hash,
                        error = %e,
                        "Receipt poll failed, will poll again"
                    );
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn read(&self, call: &LedgerCall) -> Result<Value, LedgerError> {
        let tx = self.contract.transaction(call)?;
        let output = self
            .provider
            .call(tx)
            .await
            .map_err(LedgerError::from_rpc)?;
        self.contract.decode_output(call, &output)
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| LedgerError::RpcError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::contract::tests::binding;
    use crate::blockchain::signing::signer_from_hex;
    use crate::blockchain::types::{methods, CallArg};
    use alloy::primitives::U256;
    use std::sync::Arc;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Minimal JSON-RPC node: enough of `eth_*` to fill, sign and accept
    /// operator transactions.
    mod stub_node {
        use std::sync::{Arc, Mutex};

        use alloy::consensus::{Transaction, TxEnvelope};
        use alloy::eips::eip2718::Decodable2718;
        use axum::{extract::State, routing::post, Json, Router};
        use serde_json::{json, Value};

        #[derive(Default)]
        pub struct NodeState {
            estimates: usize,
            reject_estimate: Option<usize>,
            pub broadcast_nonces: Vec<u64>,
        }

        pub type Node = Arc<Mutex<NodeState>>;

        /// Start a node that rejects the `reject_estimate`-th gas estimate.
        pub async fn spawn(reject_estimate: Option<usize>) -> (String, Node) {
            let node: Node = Arc::new(Mutex::new(NodeState {
                reject_estimate,
                ..Default::default()
            }));
            let app = Router::new().route("/", post(rpc)).with_state(node.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            (url, node)
        }

        async fn rpc(State(node): State<Node>, Json(request): Json<Value>) -> Json<Value> {
            let id = request["id"].clone();
            let method = request["method"].as_str().unwrap_or_default();
            let mut node = node.lock().unwrap();
            let result = match method {
                "eth_chainId" => Ok(json!("0x7a69")),
                "eth_getTransactionCount" => {
                    Ok(json!(format!("{:#x}", node.broadcast_nonces.len())))
                }
                "eth_estimateGas" => {
                    node.estimates += 1;
                    if node.reject_estimate == Some(node.estimates) {
                        Err((3, "execution reverted: loan not found".to_string()))
                    } else {
                        Ok(json!("0x5208"))
                    }
                }
                "eth_feeHistory" => Ok(json!({
                    "oldestBlock": "0x1",
                    "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
                    "gasUsedRatio": [0.5],
                    "reward": [["0x3b9aca00"]]
                })),
                "eth_gasPrice" | "eth_maxPriorityFeePerGas" => Ok(json!("0x3b9aca00")),
                "eth_blockNumber" => Ok(json!("0x1")),
                "eth_sendRawTransaction" => {
                    let raw = alloy::hex::decode(request["params"][0].as_str().unwrap()).unwrap();
                    let tx = TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap();
                    node.broadcast_nonces.push(tx.nonce());
                    Ok(json!(tx.tx_hash()))
                }
                other => Err((-32601, format!("method {other} not supported"))),
            };
            Json(match result {
                Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                Err((code, message)) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": code, "message": message }
                }),
            })
        }
    }

    #[test]
    fn revert_reason_drops_node_framing() {
        assert_eq!(revert_reason("execution reverted: loan not found"), "loan not found");
        assert_eq!(revert_reason("revert: insufficient collateral"), "insufficient collateral");
        assert_eq!(revert_reason("execution reverted"), "no reason given");
        assert_eq!(
            revert_reason("reverted with reason string 'x'"),
            "reverted with reason string 'x'"
        );
    }

    #[tokio::test]
    async fn rejected_operator_call_does_not_consume_a_nonce() {
        let (url, node) = stub_node::spawn(Some(2)).await;
        let operator = signer_from_hex(DEV_KEY).unwrap();
        let identity = SigningIdentity::Operator(Arc::new(operator.clone()));
        let client =
            RpcLedgerClient::connect(&url, binding(), &operator, Duration::from_millis(10))
                .unwrap();
        let call = LedgerCall::new(methods::DISBURSE_LOAN, vec![CallArg::Uint(U256::from(1u64))]);

        assert!(client.submit(&call, &identity).await.is_ok());
        let err = client.submit(&call, &identity).await.unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(_)));
        assert_eq!(err.to_string(), "Execution reverted: loan not found");
        assert!(client.submit(&call, &identity).await.is_ok());

        assert_eq!(node.lock().unwrap().broadcast_nonces, vec![0, 1]);
    }

    #[tokio::test]
    async fn concurrent_operator_calls_get_distinct_nonces() {
        let (url, node) = stub_node::spawn(None).await;
        let operator = signer_from_hex(DEV_KEY).unwrap();
        let identity = SigningIdentity::Operator(Arc::new(operator.clone()));
        let client =
            RpcLedgerClient::connect(&url, binding(), &operator, Duration::from_millis(10))
                .unwrap();
        let call = LedgerCall::new(methods::DISBURSE_LOAN, vec![CallArg::Uint(U256::from(1u64))]);

        let (a, b, c) = tokio::join!(
            client.submit(&call, &identity),
            client.submit(&call, &identity),
            client.submit(&call, &identity)
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        let mut nonces = node.lock().unwrap().broadcast_nonces.clone();
        nonces.sort_unstable();
        assert_eq!(nonces, vec![0, 1, 2]);
    }

    #[test]
    fn connect_rejects_malformed_rpc_url() {
        let operator = signer_from_hex(DEV_KEY).unwrap();
        let result = RpcLedgerClient::connect(
            "not a url",
            binding(),
            &operator,
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(LedgerError::InvalidRpcUrl(_))));
    }

    #[tokio::test]
    async fn connect_does_not_touch_the_network() {
        let operator = signer_from_hex(DEV_KEY).unwrap();
        let client = RpcLedgerClient::connect(
            "http://127.0.0.1:1",
            binding(),
            &operator,
            Duration::from_millis(10),
        )
        .unwrap();
        assert_eq!(client.contract().address(), binding().address());
    }

    #[tokio::test]
    async fn unreachable_node_surfaces_as_rpc_error() {
        let operator = signer_from_hex(DEV_KEY).unwrap();
        let client = RpcLedgerClient::connect(
            "http://127.0.0.1:1",
            binding(),
            &operator,
            Duration::from_millis(10),
        )
        .unwrap();
        assert!(matches!(
            client.block_number().await,
            Err(LedgerError::RpcError(_))
        ));
    }
}
