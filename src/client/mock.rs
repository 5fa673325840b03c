//! In-process node used by unit tests. Records every submission and receipt
//! observation in order.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::keccak256;
use ethers::utils::rlp::Rlp;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::node::{NodeBackend, Receipt, TxId};
use crate::error::{Result, WalletError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    Submitted { nonce: U256, tx_id: TxId },
    ReceiptObserved { tx_id: TxId },
}

#[derive(Debug, Clone)]
pub struct SubmittedTx {
    pub tx_id: TxId,
    pub nonce: U256,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct State {
    chain_id: u64,
    nonce: U256,
    gas_price: U256,
    native: HashMap<Address, U256>,
    calls: HashMap<(Address, Bytes), U256>,
    read_failure: Option<String>,
    receipt_failure: Option<String>,
    read_attempts: usize,
    rejected_nonces: HashMap<U256, String>,
    reverted_nonces: HashSet<U256>,
    hold_receipts: bool,
    receipts: HashMap<TxId, Receipt>,
    submitted: Vec<SubmittedTx>,
    events: Vec<NodeEvent>,
}

pub struct MockNode {
    state: Mutex<State>,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                chain_id: 11_155_111,
                gas_price: U256::from(1_000_000_000u64),
                ..Default::default()
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_nonce(&self, nonce: u64) {
        self.with(|s| s.nonce = U256::from(nonce));
    }

    pub fn set_native_balance(&self, address: Address, amount: U256) {
        self.with(|s| s.native.insert(address, amount));
    }

    pub fn set_call_result(&self, to: Address, data: Bytes, value: U256) {
        self.with(|s| s.calls.insert((to, data), value));
    }

    pub fn fail_reads(&self, reason: &str) {
        self.with(|s| s.read_failure = Some(reason.to_string()));
    }

    /// Only receipt lookups fail; everything else keeps working
    pub fn fail_receipts(&self, reason: &str) {
        self.with(|s| s.receipt_failure = Some(reason.to_string()));
    }

    pub fn read_attempts(&self) -> usize {
        self.with(|s| s.read_attempts)
    }

    /// Submissions carrying `nonce` are refused with `reason`
    pub fn reject_nonce(&self, nonce: u64, reason: &str) {
        self.with(|s| s.rejected_nonces.insert(U256::from(nonce), reason.to_string()));
    }

    /// Submissions carrying `nonce` get mined with a failed status
    pub fn revert_nonce(&self, nonce: u64) {
        self.with(|s| s.reverted_nonces.insert(U256::from(nonce)));
    }

    /// When held, submitted transactions stay receipt-less until `mine`
    pub fn hold_receipts(&self, hold: bool) {
        self.with(|s| s.hold_receipts = hold);
    }

    pub fn mine(&self, tx_id: TxId, succeeded: bool) {
        self.with(|s| {
            s.receipts.insert(tx_id, receipt(tx_id, succeeded));
        });
    }

    pub fn submitted(&self) -> Vec<SubmittedTx> {
        self.with(|s| s.submitted.clone())
    }

    pub fn events(&self) -> Vec<NodeEvent> {
        self.with(|s| s.events.clone())
    }

    fn read(&self) -> Result<()> {
        self.with(|s| {
            s.read_attempts += 1;
            match &s.read_failure {
                Some(reason) => Err(WalletError::Network(reason.clone())),
                None => Ok(()),
            }
        })
    }
}

fn receipt(tx_id: TxId, succeeded: bool) -> Receipt {
    Receipt {
        tx_id,
        block_number: Some(1),
        succeeded,
        gas_used: Some(U256::from(50_000u64)),
    }
}

fn word(value: U256) -> Bytes {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    Bytes::from(out.to_vec())
}

#[async_trait]
impl NodeBackend for MockNode {
    async fn chain_id(&self) -> Result<u64> {
        self.read()?;
        Ok(self.with(|s| s.chain_id))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.read()?;
        Ok(self.with(|s| s.native.get(&address).copied().unwrap_or_default()))
    }

    async fn get_nonce(&self, _address: Address) -> Result<U256> {
        self.read()?;
        Ok(self.with(|s| s.nonce))
    }

    async fn get_gas_price(&self) -> Result<U256> {
        self.read()?;
        Ok(self.with(|s| s.gas_price))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.read()?;
        // unknown queries answer zero, like a token with no entry for the owner
        Ok(self.with(|s| word(s.calls.get(&(to, data)).copied().unwrap_or_default())))
    }

    async fn send_raw(&self, raw: Bytes) -> Result<TxId> {
        let rlp = Rlp::new(&raw);
        let decode = |e: ethers::utils::rlp::DecoderError| WalletError::Decode(e.to_string());
        let tx = SubmittedTx {
            tx_id: TxId::from(keccak256(&raw)),
            nonce: rlp.val_at(0).map_err(decode)?,
            to: rlp.val_at(3).map_err(decode)?,
            value: rlp.val_at(4).map_err(decode)?,
            data: rlp.val_at(5).map_err(decode)?,
        };

        self.with(|s| {
            if let Some(reason) = s.rejected_nonces.get(&tx.nonce) {
                return Err(WalletError::Submission(reason.clone()));
            }
            s.events.push(NodeEvent::Submitted { nonce: tx.nonce, tx_id: tx.tx_id });
            if !s.hold_receipts {
                let ok = !s.reverted_nonces.contains(&tx.nonce);
                s.receipts.insert(tx.tx_id, receipt(tx.tx_id, ok));
            }
            s.submitted.push(tx.clone());
            Ok(tx.tx_id)
        })
    }

    async fn get_receipt(&self, tx_id: TxId) -> Result<Option<Receipt>> {
        self.read()?;
        if let Some(reason) = self.with(|s| s.receipt_failure.clone()) {
            return Err(WalletError::Network(reason));
        }
        Ok(self.with(|s| {
            let found = s.receipts.get(&tx_id).cloned();
            if found.is_some() {
                s.events.push(NodeEvent::ReceiptObserved { tx_id });
            }
            found
        }))
    }
}
