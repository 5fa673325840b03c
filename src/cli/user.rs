use std::str::FromStr;

use super::units::{format_amount, parse_amount, NATIVE_DECIMALS};
use super::{Commands, Login};
use crate::account::Session;
use crate::client::{TxId, TxStatus};
use crate::crypto;
use crate::error::{Result, WalletError};
use crate::tx::PairOutcome;
use crate::wallet::WalletService;

fn login(service: &WalletService, login: &Login) -> Result<Session> {
    let session = service.login(&login.address, &login.code)?;
    println!("Logged in as {}", crypto::checksum(&session.subject()));
    Ok(session)
}

fn print_pair(action: &str, outcome: &PairOutcome) {
    println!("Approval TX: {:?}", outcome.approval_tx);
    if let Some(receipt) = &outcome.approval_receipt {
        if let Some(block) = receipt.block_number {
            println!("  mined in block {}", block);
        }
    }
    println!("{} TX: {:?}", action, outcome.dependent_tx);
}

/// Run a user command. Admin commands are handled in `admin`.
pub async fn handle_user_command(service: &WalletService, cmd: Commands, token_decimals: u32) -> Result<()> {
    match cmd {
        Commands::Admin { .. } => {
            return Err(WalletError::InvalidInput("admin commands are not user commands".to_string()));
        }
        Commands::Balance { login: creds } => {
            let session = login(service, &creds)?;
            let balances = service.balances(&session).await?;
            println!("ETH:   {}", format_amount(balances.native, NATIVE_DECIMALS));
            println!("Token: {}", format_amount(balances.token, token_decimals));
            println!("Vault: {}", format_amount(balances.vault, token_decimals));
            session.logout();
        }
        Commands::Deposit { login: creds, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let outcome = service.deposit(&session, amount).await?;
            print_pair("Deposit", &outcome);
            session.logout();
        }
        Commands::Withdraw { login: creds, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let tx = service.withdraw(&session, amount).await?;
            println!("Withdrawn! TX: {:?}", tx);
            session.logout();
        }
        Commands::WithdrawTo { login: creds, to, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let tx = service.withdraw_to(&session, &to, amount).await?;
            println!("Sent from vault! TX: {:?}", tx);
            session.logout();
        }
        Commands::Send { login: creds, to, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let tx = service.send_token(&session, &to, amount).await?;
            println!("Sent! TX: {:?}", tx);
            session.logout();
        }
        Commands::SendEth { login: creds, to, amount } => {
            let amount = parse_amount(&amount, NATIVE_DECIMALS)?;
            let session = login(service, &creds)?;
            let tx = service.send_native(&session, &to, amount).await?;
            println!("ETH transfer sent! TX: {:?}", tx);
            session.logout();
        }
        Commands::Swap { login: creds, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let outcome = service.swap_to_native(&session, amount).await?;
            print_pair("Swap", &outcome);
            session.logout();
        }
        Commands::Approve { login: creds, spender, amount } => {
            let amount = parse_amount(&amount, token_decimals)?;
            let session = login(service, &creds)?;
            let tx = service.approve(&session, &spender, amount).await?;
            println!("Approval sent! TX: {:?}", tx);
            session.logout();
        }
        Commands::Status { tx, wait } => {
            let tx_id = TxId::from_str(tx.trim())
                .map_err(|e| WalletError::InvalidInput(format!("bad transaction hash '{}': {}", tx, e)))?;
            if wait {
                let receipt = service.await_confirmation(tx_id).await?;
                let verdict = if receipt.succeeded { "confirmed" } else { "reverted" };
                println!("{:?} {} in block {:?}", tx_id, verdict, receipt.block_number);
            } else {
                match service.status(tx_id).await? {
                    TxStatus::Pending => println!("{:?} pending (no receipt yet)", tx_id),
                    TxStatus::Confirmed(r) => println!("{:?} confirmed in block {:?}", tx_id, r.block_number),
                    TxStatus::Reverted(r) => println!("{:?} reverted in block {:?}", tx_id, r.block_number),
                }
            }
        }
    }
    Ok(())
}
