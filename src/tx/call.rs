use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;

use crate::error::{Result, WalletError};

/// An abstract write action: which contract, which method, what arguments.
///
/// `method` is the canonical Solidity signature, e.g. `approve(address,uint256)`.
/// An empty method is a plain value transfer with no calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub target: Address,
    pub method: String,
    pub arguments: Bytes,
    pub gas_limit: U256,
    pub value: U256,
}

impl CallSpec {
    pub fn contract(target: Address, method: &str, args: &[Token], gas_limit: u64) -> Self {
        Self {
            target,
            method: method.to_string(),
            arguments: abi::encode(args).into(),
            gas_limit: gas_limit.into(),
            value: U256::zero(),
        }
    }

    pub fn native_transfer(to: Address, value: U256, gas_limit: u64) -> Self {
        Self {
            target: to,
            method: String::new(),
            arguments: Bytes::new(),
            gas_limit: gas_limit.into(),
            value,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Selector followed by the encoded arguments
    pub fn calldata(&self) -> Bytes {
        if self.method.is_empty() {
            return self.arguments.clone();
        }
        let mut data = id(&self.method).to_vec();
        data.extend_from_slice(&self.arguments);
        data.into()
    }

    /// Method name without the parameter list, for logs
    pub fn method_name(&self) -> &str {
        if self.method.is_empty() {
            return "transfer(native)";
        }
        self.method.split('(').next().unwrap_or(&self.method)
    }
}

/// Encode a read-only call
pub fn read_calldata(method: &str, args: &[Token]) -> Bytes {
    let mut data = id(method).to_vec();
    data.extend_from_slice(&abi::encode(args));
    data.into()
}

/// First 32-byte word of a call result as an unsigned integer
pub fn decode_uint(output: &[u8]) -> Result<U256> {
    if output.len() < 32 {
        return Err(WalletError::Decode(format!(
            "expected a 32-byte word, got {} bytes (is the address a contract?)",
            output.len()
        )));
    }
    Ok(U256::from_big_endian(&output[..32]))
}
