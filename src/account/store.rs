//! Credential storage and management

use ethers::types::Address;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::types::{AccountRecord, CredentialEntry};
use crate::crypto;
use crate::error::{Result, WalletError};

/// Storage for custodied signing keys.
///
/// The orchestrator only ever sees records handed out by this trait, so the
/// backing medium can change without touching transaction code.
pub trait KeyStore: Send + Sync {
    /// Generate, durably store, then return a new account
    fn create(&self) -> Result<AccountRecord>;

    fn lookup(&self, address: &Address) -> Result<AccountRecord>;

    /// Write the full mapping out
    fn persist(&self) -> Result<()>;

    fn addresses(&self) -> Result<Vec<Address>>;

    /// Replace the access code of an existing account
    fn rotate_access_code(&self, address: &Address) -> Result<AccountRecord>;
}

/// Flat JSON credential file keyed by checksummed address.
///
/// The file is re-read before every operation so accounts created by
/// another process show up, and rewritten whole on every mutation.
/// Mutations hold an exclusive lock on `<file>.lock` from the re-read until
/// the new file is in place.
pub struct FileKeyStore {
    path: PathBuf,
    lock_path: PathBuf,
    accounts: Mutex<BTreeMap<Address, AccountRecord>>,
}

/// Held for the duration of a read-modify-write. Released on drop.
struct WriteLock(File);

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl FileKeyStore {
    /// Open a credential file. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let accounts = read_credentials(&path)?;
        info!(path = %path.display(), accounts = accounts.len(), "credential store opened");
        Ok(Self {
            lock_path: PathBuf::from(format!("{}.lock", path.display())),
            path,
            accounts: Mutex::new(accounts),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<Address, AccountRecord>>> {
        self.accounts
            .lock()
            .map_err(|_| WalletError::Storage("credential store lock poisoned".to_string()))
    }

    /// Block until no other handle or process is mutating the file
    fn write_lock(&self) -> Result<WriteLock> {
        let mut options = OpenOptions::new();
        options.create(true).read(true).write(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&self.lock_path).map_err(|e| {
            WalletError::Storage(format!("failed to open {}: {}", self.lock_path.display(), e))
        })?;
        file.lock_exclusive().map_err(|e| {
            WalletError::Storage(format!("failed to lock {}: {}", self.lock_path.display(), e))
        })?;
        Ok(WriteLock(file))
    }

    /// Reload from disk, replacing the in-memory view
    fn refresh(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<Address, AccountRecord>>> {
        let mut accounts = self.guard()?;
        *accounts = read_credentials(&self.path)?;
        Ok(accounts)
    }
}

impl KeyStore for FileKeyStore {
    fn create(&self) -> Result<AccountRecord> {
        let _lock = self.write_lock()?;
        let mut accounts = self.refresh()?;

        let record = AccountRecord::generate();
        let mut next = accounts.clone();
        next.insert(record.address, record.clone());

        // memory only changes once the file holds the new key
        write_credentials(&self.path, &next)?;
        *accounts = next;

        info!(address = %record.checksum_address(), "account created");
        Ok(record)
    }

    fn lookup(&self, address: &Address) -> Result<AccountRecord> {
        let accounts = self.refresh()?;
        accounts
            .get(address)
            .cloned()
            .ok_or_else(|| WalletError::NotFound(crypto::checksum(address)))
    }

    fn persist(&self) -> Result<()> {
        let _lock = self.write_lock()?;
        let accounts = self.guard()?;
        write_credentials(&self.path, &accounts)
    }

    fn addresses(&self) -> Result<Vec<Address>> {
        let accounts = self.refresh()?;
        Ok(accounts.keys().copied().collect())
    }

    fn rotate_access_code(&self, address: &Address) -> Result<AccountRecord> {
        let _lock = self.write_lock()?;
        let mut accounts = self.refresh()?;

        let mut next = accounts.clone();
        let record = next
            .get_mut(address)
            .ok_or_else(|| WalletError::NotFound(crypto::checksum(address)))?;
        record.access_code = crypto::generate_access_code();
        let record = record.clone();

        write_credentials(&self.path, &next)?;
        *accounts = next;

        info!(address = %record.checksum_address(), "access code rotated");
        Ok(record)
    }
}

fn read_credentials(path: &Path) -> Result<BTreeMap<Address, AccountRecord>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let data = fs::read_to_string(path)
        .map_err(|e| WalletError::Storage(format!("failed to read {}: {}", path.display(), e)))?;
    if data.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let entries: BTreeMap<String, CredentialEntry> = serde_json::from_str(&data)
        .map_err(|e| WalletError::Storage(format!("failed to parse {}: {}", path.display(), e)))?;

    let mut accounts = BTreeMap::new();
    for (address_key, entry) in entries {
        let record = AccountRecord::from_entry(&address_key, entry)?;
        accounts.insert(record.address, record);
    }
    debug!(path = %path.display(), accounts = accounts.len(), "credentials loaded");
    Ok(accounts)
}

/// Whole-file rewrite through a fresh temp file in the same directory,
/// renamed over the target once synced.
fn write_credentials(path: &Path, accounts: &BTreeMap<Address, AccountRecord>) -> Result<()> {
    let entries: BTreeMap<String, CredentialEntry> = accounts
        .values()
        .map(|r| (r.checksum_address(), r.to_entry()))
        .collect();
    let json = serde_json::to_string_pretty(&entries)
        .map_err(|e| WalletError::Storage(format!("failed to serialize credentials: {}", e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // created 0600 on unix; removed on drop if never persisted
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| WalletError::Storage(format!("failed to create temp file in {}: {}", dir.display(), e)))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| WalletError::Storage(format!("failed to write {}: {}", tmp.path().display(), e)))?;

    tmp.persist(path)
        .map_err(|e| WalletError::Storage(format!("failed to replace {}: {}", path.display(), e.error)))?;

    debug!(path = %path.display(), accounts = accounts.len(), "credentials written");
    Ok(())
}
