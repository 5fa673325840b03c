use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simplus_wallet::account::FileKeyStore;
use simplus_wallet::cli::{self, Cli, Commands};
use simplus_wallet::client::{ChainClient, RpcClient};
use simplus_wallet::config::WalletConfig;
use simplus_wallet::error::Result;
use simplus_wallet::wallet::WalletService;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        if let Some(tx_id) = e.broadcast_tx() {
            eprintln!(
                "Transaction {:?} reached the node. Check it with `simplus status` before retrying.",
                tx_id
            );
        }
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = WalletConfig::load_or_default(&args.config)?;
    if let Some(url) = args.rpc_url {
        config.override_rpc_url(url);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(FileKeyStore::open(&config.store.credential_file)?);
    let rpc = RpcClient::with_timeout(config.node.rpc_url.clone(), config.request_timeout())?;
    let chain = ChainClient::new(Arc::new(rpc));

    let chain_id = match config.node.chain_id {
        Some(id) => id,
        None => chain.chain_id().await?,
    };
    info!(rpc = %config.node.rpc_url, chain_id, "wallet ready");

    let service = WalletService::new(store, chain, chain_id, &config)?;
    let decimals = config.contracts.token_decimals;

    match args.command {
        Commands::Admin { cmd } => cli::admin::handle_admin_command(&service, cmd, decimals).await,
        other => cli::user::handle_user_command(&service, other, decimals).await,
    }
}
