// Ethereum JSON-RPC client over HTTP
use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256, U64};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::node::{NodeBackend, Receipt, TxId};
use crate::error::{Result, WalletError};

/// Why a JSON-RPC request did not produce a result
#[derive(Debug)]
enum RpcFailure {
    /// Never reached the node, or got garbage back
    Transport(String),
    /// The node answered with a JSON-RPC error object
    Node { code: i64, message: String },
}

impl RpcFailure {
    fn into_network(self, method: &str) -> WalletError {
        match self {
            RpcFailure::Transport(e) => WalletError::Network(format!("{}: {}", method, e)),
            RpcFailure::Node { code, message } => {
                WalletError::Network(format!("{} returned error {}: {}", method, code, message))
            }
        }
    }
}

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn with_timeout(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            url,
            client,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // Helper for sending requests
    async fn send_request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcFailure> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!(method, id, "rpc request");

        let response = self.client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(format!("request failed: {}", e)))?;

        let json: Value = response.json().await
            .map_err(|e| RpcFailure::Transport(format!("failed to parse response: {}", e)))?;

        if let Some(error) = json.get("error") {
            return Err(RpcFailure::Node {
                code: error["code"].as_i64().unwrap_or(0),
                message: error["message"].as_str().unwrap_or("Unknown error").to_string(),
            });
        }

        Ok(json.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn query<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.send_request(method, params).await
            .map_err(|e| e.into_network(method))?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Decode(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl NodeBackend for RpcClient {
    async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self.query("eth_chainId", json!([])).await?;
        Ok(id.as_u64())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.query("eth_getBalance", json!([address, "latest"])).await
    }

    async fn get_nonce(&self, address: Address) -> Result<U256> {
        self.query("eth_getTransactionCount", json!([address, "latest"])).await
    }

    async fn get_gas_price(&self) -> Result<U256> {
        self.query("eth_gasPrice", json!([])).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.query("eth_call", json!([{ "to": to, "data": data }, "latest"])).await
    }

    async fn send_raw(&self, raw: Bytes) -> Result<TxId> {
        let method = "eth_sendRawTransaction";
        match self.send_request(method, json!([raw])).await {
            Ok(result) => serde_json::from_value::<H256>(result)
                .map_err(|e| WalletError::Decode(format!("{}: {}", method, e))),
            // node looked at the transaction and said no
            Err(RpcFailure::Node { message, .. }) => Err(WalletError::Submission(message)),
            Err(e) => Err(e.into_network(method)),
        }
    }

    async fn get_receipt(&self, tx_id: TxId) -> Result<Option<Receipt>> {
        let receipt: Option<TransactionReceipt> =
            self.query("eth_getTransactionReceipt", json!([tx_id])).await?;
        Ok(receipt.map(Receipt::from))
    }
}
