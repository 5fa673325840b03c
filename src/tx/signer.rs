use ethers::signers::Signer;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Bytes, TransactionRequest, H256, U256};
use ethers::utils::keccak256;

use super::call::CallSpec;
use crate::account::AccountRecord;
use crate::client::TxId;
use crate::error::{Result, WalletError};

/// A signed, RLP-encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTx {
    /// keccak256 of `raw`; the id the node should report back
    pub tx_id: TxId,
    pub nonce: U256,
    pub method: String,
    pub raw: Bytes,
}

/// Build a legacy (gas price) transaction for `call` and sign it with the
/// account's key under EIP-155.
pub fn sign_call(
    account: &AccountRecord,
    call: &CallSpec,
    nonce: U256,
    gas_price: U256,
    chain_id: u64,
) -> Result<SignedTx> {
    let wallet = account.signing_key.wallet(chain_id);

    let request = TransactionRequest::new()
        .from(wallet.address())
        .to(call.target)
        .data(call.calldata())
        .value(call.value)
        .gas(call.gas_limit)
        .gas_price(gas_price)
        .nonce(nonce)
        .chain_id(chain_id);
    let tx: TypedTransaction = request.into();

    let signature = wallet
        .sign_transaction_sync(&tx)
        .map_err(|e| WalletError::Signing(e.to_string()))?;
    let raw = tx.rlp_signed(&signature);

    Ok(SignedTx {
        tx_id: H256::from(keccak256(&raw)),
        nonce,
        method: call.method_name().to_string(),
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::erc20;
    use ethers::types::{Address, Signature};
    use ethers::utils::rlp::Rlp;

    #[test]
    fn test_signed_tx_fields_and_signer() {
        let account = AccountRecord::generate();
        let token = Address::repeat_byte(0x10);
        let call = erc20::approve(token, Address::repeat_byte(0x20), U256::from(42u64), 80_000);
        let chain_id = 11_155_111u64;

        let signed = sign_call(&account, &call, U256::from(5u64), U256::from(1_000_000_000u64), chain_id).unwrap();
        assert_eq!(signed.tx_id, H256::from(keccak256(&signed.raw)));
        assert_eq!(signed.method, "approve");

        // legacy layout: [nonce, gasPrice, gas, to, value, data, v, r, s]
        let rlp = Rlp::new(&signed.raw);
        assert_eq!(rlp.val_at::<U256>(0).unwrap(), U256::from(5u64));
        assert_eq!(rlp.val_at::<U256>(2).unwrap(), U256::from(80_000u64));
        assert_eq!(rlp.val_at::<Address>(3).unwrap(), token);
        assert_eq!(rlp.val_at::<Vec<u8>>(5).unwrap(), call.calldata().to_vec());

        let v = rlp.val_at::<u64>(6).unwrap();
        assert!(v == chain_id * 2 + 35 || v == chain_id * 2 + 36);

        let signature = Signature {
            r: rlp.val_at::<U256>(7).unwrap(),
            s: rlp.val_at::<U256>(8).unwrap(),
            v,
        };
        let unsigned: TypedTransaction = TransactionRequest::new()
            .from(account.address)
            .to(token)
            .data(call.calldata())
            .value(U256::zero())
            .gas(call.gas_limit)
            .gas_price(U256::from(1_000_000_000u64))
            .nonce(U256::from(5u64))
            .chain_id(chain_id)
            .into();
        assert_eq!(signature.recover(unsigned.sighash()).unwrap(), account.address);
    }
}
