use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};

use crate::tx::call::{read_calldata, CallSpec};

pub const APPROVE: &str = "approve(address,uint256)";
pub const TRANSFER: &str = "transfer(address,uint256)";
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const ALLOWANCE: &str = "allowance(address,address)";

/// Let `spender` move up to `amount` of the caller's tokens
pub fn approve(token: Address, spender: Address, amount: U256, gas_limit: u64) -> CallSpec {
    CallSpec::contract(
        token,
        APPROVE,
        &[Token::Address(spender), Token::Uint(amount)],
        gas_limit,
    )
}

pub fn transfer(token: Address, to: Address, amount: U256, gas_limit: u64) -> CallSpec {
    CallSpec::contract(
        token,
        TRANSFER,
        &[Token::Address(to), Token::Uint(amount)],
        gas_limit,
    )
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    read_calldata(BALANCE_OF, &[Token::Address(owner)])
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    read_calldata(ALLOWANCE, &[Token::Address(owner), Token::Address(spender)])
}
