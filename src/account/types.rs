//! Custodial account records and their on-disk shape

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, SecretKey};
use crate::error::{Result, WalletError};

/// A custodied account: the key we sign with and the code that unlocks it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub address: Address,
    pub signing_key: SecretKey,
    pub access_code: String,
}

impl AccountRecord {
    /// Fresh key pair plus a fresh access code
    pub fn generate() -> Self {
        let signing_key = SecretKey::generate();
        Self {
            address: signing_key.address(),
            signing_key,
            access_code: crypto::generate_access_code(),
        }
    }

    pub fn checksum_address(&self) -> String {
        crypto::checksum(&self.address)
    }

    pub(crate) fn to_entry(&self) -> CredentialEntry {
        CredentialEntry {
            private_key: self.signing_key.to_hex(),
            access_code: self.access_code.clone(),
        }
    }

    /// Rebuild a record from a credential file entry.
    ///
    /// The key must derive the address it is filed under.
    pub(crate) fn from_entry(address_key: &str, entry: CredentialEntry) -> Result<Self> {
        let address = crypto::parse_address(address_key)
            .map_err(|e| WalletError::Storage(format!("bad address key in credential file: {}", e)))?;
        let signing_key = SecretKey::from_hex(&entry.private_key)
            .map_err(|e| WalletError::Storage(format!("bad key for {}: {}", address_key, e)))?;

        if signing_key.address() != address {
            return Err(WalletError::Storage(format!(
                "key stored under {} derives a different address",
                address_key
            )));
        }

        Ok(Self {
            address,
            signing_key,
            access_code: entry.access_code,
        })
    }
}

impl std::fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRecord")
            .field("address", &self.checksum_address())
            .field("signing_key", &self.signing_key)
            .field("access_code", &"<redacted>")
            .finish()
    }
}

/// One value of the credential file mapping.
///
/// Older files name the access code `password`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CredentialEntry {
    pub private_key: String,
    #[serde(alias = "password")]
    pub access_code: String,
}
