//! secp256k1 keys, checksummed addresses and access-code generation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ethers::core::k256::ecdsa::SigningKey;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::{secret_key_to_address, to_checksum};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Result, WalletError};

/// Random bytes behind each access code.
pub const ACCESS_CODE_BYTES: usize = 8;

/// Account signing key. Never printed.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    /// Generate a fresh key from the OS RNG
    pub fn generate() -> Self {
        SecretKey(SigningKey::random(&mut OsRng))
    }

    /// Parse a hex private key, with or without `0x`
    pub fn from_hex(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(body)
            .map_err(|e| WalletError::Decode(format!("private key is not hex: {}", e)))?;
        if bytes.len() != 32 {
            return Err(WalletError::Decode(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| WalletError::Decode("private key is not a valid secp256k1 scalar".to_string()))?;
        Ok(SecretKey(key))
    }

    /// `0x`-prefixed lowercase hex, the credential file encoding
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.to_bytes()))
    }

    pub fn address(&self) -> Address {
        secret_key_to_address(&self.0)
    }

    /// Signer bound to `chain_id` for EIP-155 signatures
    pub fn wallet(&self, chain_id: u64) -> LocalWallet {
        LocalWallet::from(self.0.clone()).with_chain_id(chain_id)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes() == other.0.to_bytes()
    }
}

impl Eq for SecretKey {}

/// URL-safe token carrying `ACCESS_CODE_BYTES` of entropy
pub fn generate_access_code() -> String {
    let mut entropy = [0u8; ACCESS_CODE_BYTES];
    OsRng.fill_bytes(&mut entropy);
    URL_SAFE_NO_PAD.encode(entropy)
}

/// EIP-55 form of an address
pub fn checksum(address: &Address) -> String {
    to_checksum(address, None)
}

/// Parse a user-supplied address.
///
/// All-lowercase and all-uppercase hex are accepted as-is. Mixed case must
/// match the EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidAddress(trimmed.to_string()));
    }

    let bytes = hex::decode(body).map_err(|_| WalletError::InvalidAddress(trimmed.to_string()))?;
    let address = Address::from_slice(&bytes);

    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && checksum(&address)[2..] != *body {
        return Err(WalletError::InvalidAddress(format!("{} (bad checksum)", trimmed)));
    }

    Ok(address)
}
