pub mod facade;
pub mod node;
pub mod rpc_client;

#[cfg(test)]
pub(crate) mod mock;

pub use facade::{ChainClient, TxStatus};
pub use node::{NodeBackend, Receipt, TxId};
pub use rpc_client::RpcClient;
