//! Token vault: deposits are pulled with `transferFrom`, so a deposit needs
//! a prior `approve` on the token.

use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};

use crate::tx::call::{read_calldata, CallSpec};

pub const DEPOSIT: &str = "deposit(uint256)";
pub const WITHDRAW: &str = "withdraw(uint256)";
pub const WITHDRAW_TO: &str = "withdrawTo(address,uint256)";
pub const BALANCE_OF: &str = "balanceOf(address)";

pub fn deposit(vault: Address, amount: U256, gas_limit: u64) -> CallSpec {
    CallSpec::contract(vault, DEPOSIT, &[Token::Uint(amount)], gas_limit)
}

pub fn withdraw(vault: Address, amount: U256, gas_limit: u64) -> CallSpec {
    CallSpec::contract(vault, WITHDRAW, &[Token::Uint(amount)], gas_limit)
}

/// Withdraw from the vault straight to another address
pub fn withdraw_to(vault: Address, to: Address, amount: U256, gas_limit: u64) -> CallSpec {
    CallSpec::contract(
        vault,
        WITHDRAW_TO,
        &[Token::Address(to), Token::Uint(amount)],
        gas_limit,
    )
}

/// Depositor's position in the vault
pub fn position_calldata(owner: Address) -> Bytes {
    read_calldata(BALANCE_OF, &[Token::Address(owner)])
}
