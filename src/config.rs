use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::crypto;
use crate::error::{Result, WalletError};
use crate::tx::ConfirmPolicy;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub node: NodeConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub transactions: TransactionsConfig,
    #[serde(default)]
    pub gas: GasLimits,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeConfig {
    pub rpc_url: String,
    /// Fetched from the node when absent
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    pub credential_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            credential_file: "credentials.json".to_string(),
        }
    }
}

/// Deployed contracts the wallet talks to. Addresses are kept as text so the
/// file stays readable; see [`ContractsConfig::resolve`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ContractsConfig {
    pub token: String,
    pub token_decimals: u32,
    pub vault: String,
    pub router: String,
    pub wrapped_native: String,
    /// Pool fee tier in hundredths of a basis point
    pub pool_fee: u32,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        // Sepolia deployment
        Self {
            token: "0x2Bc7c4Afc076088DB03366a6CA9729ba9E450DaA".to_string(),
            token_decimals: 6,
            vault: "0x7263b8726C96566927626773CbD6B19d32ff76E3".to_string(),
            router: "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45".to_string(),
            wrapped_native: "0xc778417E063141139Fce010982780140Aa0cD5Ab".to_string(),
            pool_fee: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token: Address,
    pub vault: Address,
    pub router: Address,
    pub wrapped_native: Address,
}

impl ContractsConfig {
    pub fn resolve(&self) -> Result<ContractAddresses> {
        let parse = |field: &str, value: &str| {
            crypto::parse_address(value)
                .map_err(|e| WalletError::Config(format!("contracts.{}: {}", field, e)))
        };
        Ok(ContractAddresses {
            token: parse("token", &self.token)?,
            vault: parse("vault", &self.vault)?,
            router: parse("router", &self.router)?,
            wrapped_native: parse("wrapped_native", &self.wrapped_native)?,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TransactionsConfig {
    /// Wait for an approval to be mined before sending the call that spends it
    pub confirm_before_dependent: bool,
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub swap_deadline_secs: u64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            confirm_before_dependent: true,
            confirmation_timeout_secs: 180,
            poll_interval_ms: 3000,
            swap_deadline_secs: 600,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct GasLimits {
    pub approve: u64,
    pub transfer: u64,
    pub deposit: u64,
    pub withdraw: u64,
    pub withdraw_to: u64,
    pub swap: u64,
    pub native_transfer: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            approve: 100_000,
            transfer: 100_000,
            deposit: 100_000,
            withdraw: 100_000,
            withdraw_to: 120_000,
            swap: 400_000,
            native_transfer: 21_000,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            node: NodeConfig {
                rpc_url: "https://rpc.sepolia.org".to_string(),
                chain_id: Some(11_155_111),
                request_timeout_secs: default_request_timeout(),
            },
            store: StoreConfig::default(),
            contracts: ContractsConfig::default(),
            transactions: TransactionsConfig::default(),
            gas: GasLimits::default(),
        }
    }
}

impl WalletConfig {
    /// Read `path`, or write the defaults there if it does not exist yet.
    ///
    /// Runs before logging is up, so it reports on stderr.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| WalletError::Config(format!("reading {}: {}", path.display(), e)))?;
            toml::from_str(&s)
                .map_err(|e| WalletError::Config(format!("parsing {}: {}", path.display(), e)))
        } else {
            eprintln!("Config file not found at '{}'. Creating default.", path.display());
            let config = Self::default();
            let s = toml::to_string_pretty(&config)
                .map_err(|e| WalletError::Config(e.to_string()))?;
            if let Err(e) = std::fs::write(path, s) {
                eprintln!("Could not write default config: {}", e);
            }
            Ok(config)
        }
    }

    /// Point at a different node. The pinned chain id belonged to the old
    /// one, so it is dropped and fetched from the new node instead.
    pub fn override_rpc_url(&mut self, url: String) {
        self.node.rpc_url = url;
        self.node.chain_id = None;
    }

    pub fn confirm_policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            confirm_before_dependent: self.transactions.confirm_before_dependent,
            timeout: Duration::from_secs(self.transactions.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(self.transactions.poll_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.node.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("simplus.toml");

        let config = WalletConfig::load_or_default(&path).unwrap();
        assert_eq!(config, WalletConfig::default());
        assert!(path.exists());

        // and reads them back unchanged
        let again = WalletConfig::load_or_default(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_partial_file_fills_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("simplus.toml");
        std::fs::write(
            &path,
            r#"
[node]
rpc_url = "http://127.0.0.1:8545"

[transactions]
confirm_before_dependent = false
confirmation_timeout_secs = 30
poll_interval_ms = 500
swap_deadline_secs = 600
"#,
        )
        .unwrap();

        let config = WalletConfig::load_or_default(&path).unwrap();
        assert_eq!(config.node.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.node.chain_id, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.gas, GasLimits::default());

        let policy = config.confirm_policy();
        assert!(!policy.confirm_before_dependent);
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_rpc_override_drops_pinned_chain_id() {
        let mut config = WalletConfig::default();
        assert_eq!(config.node.chain_id, Some(11_155_111));

        config.override_rpc_url("http://127.0.0.1:8545".to_string());
        assert_eq!(config.node.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.node.chain_id, None);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("simplus.toml");
        std::fs::write(&path, "[node\nrpc_url = ").unwrap();
        assert!(matches!(WalletConfig::load_or_default(&path), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_default_contracts_resolve() {
        let addresses = ContractsConfig::default().resolve().unwrap();
        assert_eq!(
            crypto::checksum(&addresses.token),
            "0x2Bc7c4Afc076088DB03366a6CA9729ba9E450DaA"
        );

        let bad = ContractsConfig {
            vault: "0x1234".to_string(),
            ..ContractsConfig::default()
        };
        assert!(matches!(bad.resolve(), Err(WalletError::Config(_))));
    }
}
