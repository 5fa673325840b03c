use ethers::types::{Address, Bytes, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::node::{NodeBackend, Receipt, TxId};
use crate::contracts::{erc20, vault};
use crate::error::{Result, WalletError};
use crate::tx::call::decode_uint;
use crate::tx::signer::SignedTx;

/// Outcome of a one-shot status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// No receipt yet: may still be mined, may have been dropped
    Pending,
    Confirmed(Receipt),
    Reverted(Receipt),
}

/// Reads and writes against a node, in the wallet's terms.
#[derive(Clone)]
pub struct ChainClient {
    node: Arc<dyn NodeBackend>,
}

impl ChainClient {
    pub fn new(node: Arc<dyn NodeBackend>) -> Self {
        Self { node }
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.node.chain_id().await
    }

    pub async fn native_balance(&self, address: Address) -> Result<U256> {
        self.node.get_balance(address).await
    }

    pub async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        self.read_uint(token, erc20::balance_of_calldata(owner)).await
    }

    pub async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.read_uint(token, erc20::allowance_calldata(owner, spender)).await
    }

    pub async fn vault_position(&self, vault_address: Address, owner: Address) -> Result<U256> {
        self.read_uint(vault_address, vault::position_calldata(owner)).await
    }

    pub async fn nonce(&self, address: Address) -> Result<U256> {
        self.node.get_nonce(address).await
    }

    pub async fn gas_price(&self) -> Result<U256> {
        self.node.get_gas_price().await
    }

    async fn read_uint(&self, contract: Address, data: Bytes) -> Result<U256> {
        let output = self.node.call(contract, data).await?;
        decode_uint(&output)
    }

    /// Broadcast a signed transaction. Only a returned id counts as accepted.
    pub async fn submit(&self, tx: &SignedTx) -> Result<TxId> {
        let tx_id = match self.node.send_raw(tx.raw.clone()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(method = %tx.method, nonce = %tx.nonce, error = %e, "submission failed");
                return Err(e);
            }
        };
        if tx_id != tx.tx_id {
            warn!(local = ?tx.tx_id, node = ?tx_id, "node reported a different transaction hash");
        }
        info!(method = %tx.method, nonce = %tx.nonce, tx = ?tx_id, "transaction submitted");
        Ok(tx_id)
    }

    /// Ask once whether `tx_id` has been included. Safe to repeat.
    pub async fn status(&self, tx_id: TxId) -> Result<TxStatus> {
        Ok(match self.node.get_receipt(tx_id).await? {
            None => TxStatus::Pending,
            Some(r) if r.succeeded => TxStatus::Confirmed(r),
            Some(r) => TxStatus::Reverted(r),
        })
    }

    /// Poll for a receipt until `bound` elapses.
    ///
    /// A timeout says nothing about the transaction's fate: it is reported as
    /// `Timeout` and may still be mined later.
    pub async fn await_confirmation(&self, tx_id: TxId, bound: Duration, poll_interval: Duration) -> Result<Receipt> {
        let deadline = Instant::now() + bound;
        loop {
            if let Some(receipt) = self.node.get_receipt(tx_id).await? {
                debug!(tx = ?tx_id, block = ?receipt.block_number, "receipt observed");
                return Ok(receipt);
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(tx = ?tx_id, bound_secs = bound.as_secs(), "no receipt within bound");
                return Err(WalletError::Timeout { tx_id });
            }
            sleep(poll_interval.min(deadline - now)).await;
        }
    }
}
