//! Uniswap V3 style router, single-pool exact-input swaps.

use ethers::abi::Token;
use ethers::types::{Address, U256};

use crate::tx::call::CallSpec;

pub const EXACT_INPUT_SINGLE: &str =
    "exactInputSingle(address,address,uint24,address,uint256,uint256,uint256,uint160)";

#[derive(Debug, Clone)]
pub struct ExactInputSingle {
    pub token_in: Address,
    pub token_out: Address,
    /// Pool fee in hundredths of a basis point (3000 = 0.3%)
    pub fee: u32,
    pub recipient: Address,
    /// Unix seconds
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

pub fn exact_input_single(router: Address, params: &ExactInputSingle, gas_limit: u64) -> CallSpec {
    CallSpec::contract(
        router,
        EXACT_INPUT_SINGLE,
        &[
            Token::Address(params.token_in),
            Token::Address(params.token_out),
            Token::Uint(U256::from(params.fee)),
            Token::Address(params.recipient),
            Token::Uint(params.deadline),
            Token::Uint(params.amount_in),
            Token::Uint(params.amount_out_minimum),
            Token::Uint(params.sqrt_price_limit_x96),
        ],
        gas_limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_eight_words() {
        let params = ExactInputSingle {
            token_in: Address::repeat_byte(1),
            token_out: Address::repeat_byte(2),
            fee: 3000,
            recipient: Address::repeat_byte(3),
            deadline: U256::from(1_700_000_600u64),
            amount_in: U256::from(10u64).pow(18.into()),
            amount_out_minimum: U256::zero(),
            sqrt_price_limit_x96: U256::zero(),
        };
        let call = exact_input_single(Address::repeat_byte(9), &params, 400_000);
        let data = call.calldata();

        assert_eq!(data.len(), 4 + 8 * 32);
        assert_eq!(U256::from_big_endian(&data[4 + 64..4 + 96]), U256::from(3000u64));
        assert_eq!(U256::from_big_endian(&data[4 + 160..4 + 192]), params.amount_in);
        assert!(call.value.is_zero());
    }
}
