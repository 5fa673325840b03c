pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod error;
pub mod tx;
pub mod wallet;
