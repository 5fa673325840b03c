//! Approve-then-act sequencing.
//!
//! Many wallet actions need an ERC-20 allowance first: the vault pulls tokens
//! on `deposit`, the router pulls them on a swap. The orchestrator signs both
//! halves up front with consecutive nonces and then broadcasts them in order,
//! optionally waiting for the approval to be mined in between.

use ethers::types::U256;
use std::time::Duration;
use tracing::{info, warn};

use super::call::CallSpec;
use super::signer::{sign_call, SignedTx};
use crate::account::AccountRecord;
use crate::client::{ChainClient, Receipt, TxId};
use crate::error::{Result, WalletError};

/// How the orchestrator treats the gap between approval and dependent action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    /// Wait for the approval receipt before broadcasting the dependent call
    pub confirm_before_dependent: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            confirm_before_dependent: true,
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(3),
        }
    }
}

/// Both halves of an approve/act pair, signed before either is sent.
#[derive(Debug, Clone)]
pub struct PendingPair {
    pub nonce_base: U256,
    pub approval: SignedTx,
    pub dependent: SignedTx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub approval_tx: TxId,
    pub dependent_tx: TxId,
    /// Present only when the orchestrator waited for the approval
    pub approval_receipt: Option<Receipt>,
}

pub struct TxOrchestrator {
    chain: ChainClient,
    chain_id: u64,
    policy: ConfirmPolicy,
}

impl TxOrchestrator {
    pub fn new(chain: ChainClient, chain_id: u64, policy: ConfirmPolicy) -> Self {
        Self { chain, chain_id, policy }
    }

    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }

    pub fn policy(&self) -> ConfirmPolicy {
        self.policy
    }

    /// Fetch the nonce and gas price once, then sign the approval at N and the
    /// dependent call at N+1.
    pub async fn prepare_pair(
        &self,
        account: &AccountRecord,
        approve: &CallSpec,
        action: &CallSpec,
    ) -> Result<PendingPair> {
        let nonce = self.chain.nonce(account.address).await?;
        let gas_price = self.chain.gas_price().await?;

        let approval = sign_call(account, approve, nonce, gas_price, self.chain_id)?;
        let dependent = sign_call(account, action, nonce + 1, gas_price, self.chain_id)?;

        Ok(PendingPair {
            nonce_base: nonce,
            approval,
            dependent,
        })
    }

    pub async fn execute_dependent_pair(
        &self,
        account: &AccountRecord,
        approve: &CallSpec,
        action: &CallSpec,
    ) -> Result<PairOutcome> {
        let pair = self.prepare_pair(account, approve, action).await?;
        info!(
            account = ?account.address,
            nonce = %pair.nonce_base,
            approve = %pair.approval.method,
            action = %pair.dependent.method,
            "submitting approve/act pair"
        );

        // nothing is on the wire yet, so any error here is a clean failure
        let approval_tx = self.chain.submit(&pair.approval).await?;

        let approval_receipt = if self.policy.confirm_before_dependent {
            // the approval is on the wire: every failure from here names it
            let receipt = match self
                .chain
                .await_confirmation(approval_tx, self.policy.timeout, self.policy.poll_interval)
                .await
            {
                Ok(receipt) => receipt,
                Err(e @ WalletError::Timeout { .. }) => return Err(e),
                Err(e) => {
                    warn!(tx = ?approval_tx, error = %e, "lost track of approval; dependent call not sent");
                    return Err(WalletError::ConfirmationFailed {
                        tx_id: approval_tx,
                        reason: failure_reason(e),
                    });
                }
            };
            if !receipt.succeeded {
                warn!(tx = ?approval_tx, "approval reverted; dependent call not sent");
                return Err(WalletError::Reverted { tx_id: approval_tx });
            }
            Some(receipt)
        } else {
            None
        };

        let dependent_tx = match self.chain.submit(&pair.dependent).await {
            Ok(id) => id,
            Err(e) => {
                warn!(approval = ?approval_tx, error = %e, "dependent call failed after approval was broadcast");
                return Err(WalletError::PartialFailure {
                    approval_tx,
                    reason: failure_reason(e),
                });
            }
        };

        Ok(PairOutcome {
            approval_tx,
            dependent_tx,
            approval_receipt,
        })
    }

    /// Nonce, sign, submit.
    pub async fn execute_single(&self, account: &AccountRecord, call: &CallSpec) -> Result<TxId> {
        let nonce = self.chain.nonce(account.address).await?;
        let gas_price = self.chain.gas_price().await?;
        let signed = sign_call(account, call, nonce, gas_price, self.chain_id)?;
        self.chain.submit(&signed).await
    }
}

fn failure_reason(e: WalletError) -> String {
    match e {
        WalletError::Submission(reason) | WalletError::Network(reason) => reason,
        other => other.to_string(),
    }
}
