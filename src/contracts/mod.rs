//! Call builders for the contracts the wallet talks to

pub mod erc20;
pub mod vault;
pub mod router;
