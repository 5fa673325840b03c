pub mod admin;
pub mod units;
pub mod user;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "simplus")]
#[command(about = "Simplus custodial wallet", long_about = None)]
pub struct Cli {
    /// Path to the TOML config (created with defaults if missing)
    #[arg(long, default_value = "simplus.toml")]
    pub config: String,
    /// Override the node URL from the config
    #[arg(long)]
    pub rpc_url: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Address and access code, checked before any user command runs
#[derive(Args, Debug, Clone)]
pub struct Login {
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub code: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Account administration
    Admin {
        #[command(subcommand)]
        cmd: admin::AdminCommands,
    },
    /// Show native, token and vault balances
    Balance {
        #[command(flatten)]
        login: Login,
    },
    /// Approve the vault and deposit tokens into it
    Deposit {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        amount: String,
    },
    /// Withdraw tokens from the vault to your own address
    Withdraw {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        amount: String,
    },
    /// Withdraw tokens from the vault to another address
    WithdrawTo {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Transfer tokens held in the wallet
    Send {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Transfer native ETH
    SendEth {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Swap tokens for wrapped ETH through the router
    Swap {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        amount: String,
    },
    /// Grant a token allowance
    Approve {
        #[command(flatten)]
        login: Login,
        #[arg(long)]
        spender: String,
        #[arg(long)]
        amount: String,
    },
    /// Look up a transaction by hash
    Status {
        tx: String,
        /// Keep polling until mined or the configured bound passes
        #[arg(long)]
        wait: bool,
    },
}
