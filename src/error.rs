use ethers::types::H256;
use thiserror::Error;

/// Why an access-code login was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MalformedAddress,
    UnknownAddress,
    CodeMismatch,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MalformedAddress => write!(f, "malformed address"),
            RejectReason::UnknownAddress => write!(f, "unknown address"),
            RejectReason::CodeMismatch => write!(f, "access code mismatch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("Invalid wallet address or access code ({0})")]
    Rejected(RejectReason),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Transaction rejected by node: {0}")]
    Submission(String),
    #[error("Approval {approval_tx:?} was broadcast but the dependent transaction failed: {reason}. The allowance is still standing")]
    PartialFailure { approval_tx: H256, reason: String },
    #[error("No receipt for {tx_id:?} within the wait bound; transaction state unknown")]
    Timeout { tx_id: H256 },
    #[error("Could not confirm {tx_id:?} after broadcast: {reason}; transaction state unknown")]
    ConfirmationFailed { tx_id: H256, reason: String },
    #[error("Transaction {tx_id:?} was mined but reverted")]
    Reverted { tx_id: H256 },
    #[error("Credential storage error: {0}")]
    Storage(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: String, required: String },
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl WalletError {
    /// True when the first half of an approve/act pair landed but the second did not.
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, WalletError::PartialFailure { .. })
    }

    /// A transaction that reached the node even though the operation failed
    pub fn broadcast_tx(&self) -> Option<H256> {
        match self {
            WalletError::PartialFailure { approval_tx, .. } => Some(*approval_tx),
            WalletError::Timeout { tx_id }
            | WalletError::ConfirmationFailed { tx_id, .. }
            | WalletError::Reverted { tx_id } => Some(*tx_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
