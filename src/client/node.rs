use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};

use crate::error::Result;

/// Transaction hash as returned by the node
pub type TxId = H256;

/// Inclusion record for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_id: TxId,
    pub block_number: Option<u64>,
    pub succeeded: bool,
    pub gas_used: Option<U256>,
}

impl From<TransactionReceipt> for Receipt {
    fn from(r: TransactionReceipt) -> Self {
        Self {
            tx_id: r.transaction_hash,
            block_number: r.block_number.map(|n| n.as_u64()),
            // pre-Byzantium receipts carry no status
            succeeded: r.status.map(|s| s.as_u64() == 1).unwrap_or(true),
            gas_used: r.gas_used,
        }
    }
}

/// What the wallet needs from a remote node.
///
/// Reads fail with `Network`; `send_raw` fails with `Submission` when the
/// node refuses the transaction. Nothing here retries.
#[async_trait]
pub trait NodeBackend: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Transaction count of `address` at the latest block
    async fn get_nonce(&self, address: Address) -> Result<U256>;

    async fn get_gas_price(&self) -> Result<U256>;

    /// Simulate a read-only contract call
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    async fn send_raw(&self, raw: Bytes) -> Result<TxId>;

    /// `None` while the transaction is not yet included
    async fn get_receipt(&self, tx_id: TxId) -> Result<Option<Receipt>>;
}
