pub mod call;
pub mod orchestrator;
pub mod signer;

pub use call::CallSpec;
pub use orchestrator::{ConfirmPolicy, PairOutcome, PendingPair, TxOrchestrator};
pub use signer::{sign_call, SignedTx};
