//! Custodial account module
//!
//! - Flat-file credential store behind the `KeyStore` trait
//! - Access-code authentication producing explicit `Session` values

pub mod types;
pub mod store;
pub mod auth;

pub use types::AccountRecord;
pub use store::{FileKeyStore, KeyStore};
pub use auth::{access_code_matches, AuthGate, Session};
