use clap::Subcommand;

use super::units::{format_amount, NATIVE_DECIMALS};
use crate::crypto;
use crate::error::Result;
use crate::wallet::WalletService;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Generate a new custodial account and print its access code
    Create,
    /// List stored addresses
    List,
    /// Issue a new access code for an address
    Rotate {
        #[arg(long)]
        address: String,
    },
    /// Balances of any address
    Balance {
        address: String,
    },
}

pub async fn handle_admin_command(service: &WalletService, cmd: AdminCommands, token_decimals: u32) -> Result<()> {
    match cmd {
        AdminCommands::Create => {
            let record = service.create_account()?;
            println!("Wallet created.");
            println!("Address:     {}", record.checksum_address());
            println!("Access code: {}", record.access_code);
            println!("Share the address and access code with the user.");
        }
        AdminCommands::List => {
            let addresses = service.accounts()?;
            if addresses.is_empty() {
                println!("No accounts.");
            }
            for address in addresses {
                println!("{}", crypto::checksum(&address));
            }
        }
        AdminCommands::Rotate { address } => {
            let record = service.rotate_access_code(&address)?;
            println!("New access code for {}: {}", record.checksum_address(), record.access_code);
        }
        AdminCommands::Balance { address } => {
            let balances = service.balances_of(&address).await?;
            println!("ETH:   {}", format_amount(balances.native, NATIVE_DECIMALS));
            println!("Token: {}", format_amount(balances.token, token_decimals));
            println!("Vault: {}", format_amount(balances.vault, token_decimals));
        }
    }
    Ok(())
}
