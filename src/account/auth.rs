//! Access-code login

use chrono::{DateTime, Utc};
use ethers::types::Address;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::store::KeyStore;
use super::types::AccountRecord;
use crate::crypto;
use crate::error::{RejectReason, Result, WalletError};

/// Proof that someone presented the right access code for `subject`.
///
/// Holds the address only; signing keys are fetched from the store when an
/// operation needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    subject: Address,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(subject: Address) -> Self {
        Self {
            subject,
            authenticated_at: Utc::now(),
        }
    }

    pub fn subject(&self) -> Address {
        self.subject
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    pub fn logout(self) {
        info!(address = %crypto::checksum(&self.subject), "logged out");
    }
}

/// Compare a submitted code against the stored one.
///
/// Depends on nothing but its two inputs.
pub fn access_code_matches(record: &AccountRecord, submitted: &str) -> bool {
    record
        .access_code
        .as_bytes()
        .ct_eq(submitted.as_bytes())
        .into()
}

/// Turns (address, access code) pairs into sessions.
///
/// There is no lockout or attempt counting: every call is judged on its own.
pub struct AuthGate {
    store: Arc<dyn KeyStore>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    pub fn authenticate(&self, address: &str, access_code: &str) -> Result<Session> {
        let address = match crypto::parse_address(address) {
            Ok(a) => a,
            Err(_) => return Err(reject(address, RejectReason::MalformedAddress)),
        };
        let shown = crypto::checksum(&address);

        let record = match self.store.lookup(&address) {
            Ok(r) => r,
            Err(WalletError::NotFound(_)) => return Err(reject(&shown, RejectReason::UnknownAddress)),
            Err(e) => return Err(e),
        };

        if !access_code_matches(&record, access_code) {
            return Err(reject(&shown, RejectReason::CodeMismatch));
        }

        info!(address = %shown, "access granted");
        Ok(Session::new(address))
    }
}

fn reject(address: &str, reason: RejectReason) -> WalletError {
    warn!(address = %address, %reason, "login rejected");
    WalletError::Rejected(reason)
}
