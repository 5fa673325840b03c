use ethers::types::U256;
use ethers::utils::{format_units, parse_units};

use crate::error::{Result, WalletError};

pub const NATIVE_DECIMALS: u32 = 18;

/// Decimal text such as `"1.5"` to smallest units.
pub fn parse_amount(input: &str, decimals: u32) -> Result<U256> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(WalletError::InvalidInput(format!("negative amount: {}", trimmed)));
    }
    // parse_units truncates extra digits; an amount must be sent exactly as typed
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(WalletError::InvalidInput(format!(
                "'{}' has more than {} decimal places",
                trimmed, decimals
            )));
        }
    }
    let parsed = parse_units(trimmed, decimals)
        .map_err(|e| WalletError::InvalidInput(format!("bad amount '{}': {}", trimmed, e)))?;
    Ok(parsed.into())
}

pub fn format_amount(amount: U256, decimals: u32) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}
