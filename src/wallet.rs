//! Admin and user operations of the custodial wallet.
//!
//! Every user operation takes a [`Session`]; the signing key is looked up in
//! the store for the duration of the call and never kept on the service.

use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::account::{AccountRecord, AuthGate, KeyStore, Session};
use crate::client::{ChainClient, Receipt, TxId, TxStatus};
use crate::config::{ContractAddresses, GasLimits, WalletConfig};
use crate::contracts::router::ExactInputSingle;
use crate::contracts::{erc20, router, vault};
use crate::crypto;
use crate::error::{Result, WalletError};
use crate::tx::{CallSpec, PairOutcome, TxOrchestrator};

/// Holdings of one address, in smallest units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub native: U256,
    pub token: U256,
    /// Token held by the vault on the owner's behalf
    pub vault: U256,
}

pub struct WalletService {
    store: Arc<dyn KeyStore>,
    gate: AuthGate,
    orchestrator: TxOrchestrator,
    contracts: ContractAddresses,
    pool_fee: u32,
    gas: GasLimits,
    swap_deadline: Duration,
}

impl WalletService {
    pub fn new(
        store: Arc<dyn KeyStore>,
        chain: ChainClient,
        chain_id: u64,
        config: &WalletConfig,
    ) -> Result<Self> {
        Ok(Self {
            gate: AuthGate::new(store.clone()),
            store,
            orchestrator: TxOrchestrator::new(chain, chain_id, config.confirm_policy()),
            contracts: config.contracts.resolve()?,
            pool_fee: config.contracts.pool_fee,
            gas: config.gas,
            swap_deadline: Duration::from_secs(config.transactions.swap_deadline_secs),
        })
    }

    pub fn contracts(&self) -> &ContractAddresses {
        &self.contracts
    }

    fn chain(&self) -> &ChainClient {
        self.orchestrator.chain()
    }

    // --- admin ---

    pub fn create_account(&self) -> Result<AccountRecord> {
        self.store.create()
    }

    pub fn accounts(&self) -> Result<Vec<Address>> {
        self.store.addresses()
    }

    pub fn rotate_access_code(&self, address: &str) -> Result<AccountRecord> {
        let address = crypto::parse_address(address)?;
        self.store.rotate_access_code(&address)
    }

    /// Balances of any address, no login required
    pub async fn balances_of(&self, address: &str) -> Result<Balances> {
        let address = crypto::parse_address(address)?;
        self.read_balances(address).await
    }

    // --- user ---

    pub fn login(&self, address: &str, access_code: &str) -> Result<Session> {
        self.gate.authenticate(address, access_code)
    }

    pub async fn balances(&self, session: &Session) -> Result<Balances> {
        self.read_balances(session.subject()).await
    }

    async fn read_balances(&self, owner: Address) -> Result<Balances> {
        let chain = self.chain();
        Ok(Balances {
            native: chain.native_balance(owner).await?,
            token: chain.token_balance(self.contracts.token, owner).await?,
            vault: chain.vault_position(self.contracts.vault, owner).await?,
        })
    }

    fn signer(&self, session: &Session) -> Result<AccountRecord> {
        self.store.lookup(&session.subject())
    }

    /// Approve the vault for `amount`, then deposit it.
    pub async fn deposit(&self, session: &Session, amount: U256) -> Result<PairOutcome> {
        require_positive(amount)?;
        let account = self.signer(session)?;
        let approve = erc20::approve(self.contracts.token, self.contracts.vault, amount, self.gas.approve);
        let deposit = vault::deposit(self.contracts.vault, amount, self.gas.deposit);

        let outcome = self.orchestrator.execute_dependent_pair(&account, &approve, &deposit).await?;
        info!(account = ?account.address, %amount, tx = ?outcome.dependent_tx, "deposit submitted");
        Ok(outcome)
    }

    /// Approve the router, then swap `amount` of the token for wrapped native.
    ///
    /// No minimum output is enforced.
    pub async fn swap_to_native(&self, session: &Session, amount: U256) -> Result<PairOutcome> {
        require_positive(amount)?;
        let account = self.signer(session)?;

        let available = self.chain().token_balance(self.contracts.token, account.address).await?;
        require_funds(available, amount)?;

        let params = ExactInputSingle {
            token_in: self.contracts.token,
            token_out: self.contracts.wrapped_native,
            fee: self.pool_fee,
            recipient: account.address,
            deadline: self.deadline()?,
            amount_in: amount,
            amount_out_minimum: U256::zero(),
            sqrt_price_limit_x96: U256::zero(),
        };
        let approve = erc20::approve(self.contracts.token, self.contracts.router, amount, self.gas.approve);
        let swap = router::exact_input_single(self.contracts.router, &params, self.gas.swap);

        let outcome = self.orchestrator.execute_dependent_pair(&account, &approve, &swap).await?;
        info!(account = ?account.address, %amount, tx = ?outcome.dependent_tx, "swap submitted");
        Ok(outcome)
    }

    fn deadline(&self) -> Result<U256> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WalletError::InvalidInput(format!("system clock: {}", e)))?;
        Ok(U256::from((now + self.swap_deadline).as_secs()))
    }

    /// Pull `amount` out of the vault back to the caller
    pub async fn withdraw(&self, session: &Session, amount: U256) -> Result<TxId> {
        require_positive(amount)?;
        let call = vault::withdraw(self.contracts.vault, amount, self.gas.withdraw);
        self.single(session, call).await
    }

    /// Pull `amount` out of the vault to someone else
    pub async fn withdraw_to(&self, session: &Session, to: &str, amount: U256) -> Result<TxId> {
        require_positive(amount)?;
        let to = crypto::parse_address(to)?;
        let call = vault::withdraw_to(self.contracts.vault, to, amount, self.gas.withdraw_to);
        self.single(session, call).await
    }

    pub async fn send_token(&self, session: &Session, to: &str, amount: U256) -> Result<TxId> {
        require_positive(amount)?;
        let to = crypto::parse_address(to)?;
        let call = erc20::transfer(self.contracts.token, to, amount, self.gas.transfer);
        self.single(session, call).await
    }

    /// Plain value transfer. Gas is not counted against the balance check.
    pub async fn send_native(&self, session: &Session, to: &str, amount: U256) -> Result<TxId> {
        require_positive(amount)?;
        let to = crypto::parse_address(to)?;
        let available = self.chain().native_balance(session.subject()).await?;
        require_funds(available, amount)?;

        let call = CallSpec::native_transfer(to, amount, self.gas.native_transfer);
        self.single(session, call).await
    }

    /// Standalone allowance for `spender` on the configured token
    pub async fn approve(&self, session: &Session, spender: &str, amount: U256) -> Result<TxId> {
        let spender = crypto::parse_address(spender)?;
        let call = erc20::approve(self.contracts.token, spender, amount, self.gas.approve);
        self.single(session, call).await
    }

    async fn single(&self, session: &Session, call: CallSpec) -> Result<TxId> {
        let account = self.signer(session)?;
        let tx_id = self.orchestrator.execute_single(&account, &call).await?;
        info!(account = ?account.address, method = %call.method_name(), tx = ?tx_id, "transaction submitted");
        Ok(tx_id)
    }

    pub async fn status(&self, tx_id: TxId) -> Result<TxStatus> {
        self.chain().status(tx_id).await
    }

    /// Wait for `tx_id` using the configured bound
    pub async fn await_confirmation(&self, tx_id: TxId) -> Result<Receipt> {
        let policy = self.orchestrator.policy();
        self.chain().await_confirmation(tx_id, policy.timeout, policy.poll_interval).await
    }
}

fn require_positive(amount: U256) -> Result<()> {
    if amount.is_zero() {
        return Err(WalletError::InvalidInput("amount must be greater than zero".to_string()));
    }
    Ok(())
}

fn require_funds(available: U256, required: U256) -> Result<()> {
    if available < required {
        return Err(WalletError::InsufficientFunds {
            available: available.to_string(),
            required: required.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::FileKeyStore;
    use crate::client::mock::MockNode;
    use crate::error::RejectReason;

    struct Fixture {
        _dir: tempfile::TempDir,
        node: Arc<MockNode>,
        service: WalletService,
    }

    fn fixture(confirm: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileKeyStore::open(dir.path().join("credentials.json")).unwrap());
        let node = Arc::new(MockNode::new());

        let mut config = WalletConfig::default();
        config.transactions.confirm_before_dependent = confirm;
        config.transactions.confirmation_timeout_secs = 5;
        config.transactions.poll_interval_ms = 100;

        let service = WalletService::new(store, ChainClient::new(node.clone()), 11_155_111, &config).unwrap();
        Fixture { _dir: dir, node, service }
    }

    fn logged_in(f: &Fixture) -> (AccountRecord, Session) {
        let record = f.service.create_account().unwrap();
        let session = f.service.login(&record.checksum_address(), &record.access_code).unwrap();
        (record, session)
    }

    #[test]
    fn test_admin_create_list_rotate() {
        let f = fixture(true);
        let record = f.service.create_account().unwrap();
        assert_eq!(f.service.accounts().unwrap(), vec![record.address]);

        let rotated = f.service.rotate_access_code(&record.checksum_address()).unwrap();
        assert_ne!(rotated.access_code, record.access_code);

        let stale = f.service.login(&record.checksum_address(), &record.access_code);
        assert!(matches!(stale, Err(WalletError::Rejected(RejectReason::CodeMismatch))));
        assert!(f.service.login(&record.checksum_address(), &rotated.access_code).is_ok());
    }

    #[tokio::test]
    async fn test_balances() {
        let f = fixture(true);
        let (record, session) = logged_in(&f);
        let contracts = *f.service.contracts();
        f.node.set_native_balance(record.address, U256::exp10(17));
        f.node.set_call_result(contracts.token, erc20::balance_of_calldata(record.address), U256::from(2_500_000u64));

        let balances = f.service.balances(&session).await.unwrap();
        assert_eq!(balances.native, U256::exp10(17));
        assert_eq!(balances.token, U256::from(2_500_000u64));
        assert_eq!(balances.vault, U256::zero());

        let admin_view = f.service.balances_of(&record.checksum_address()).await.unwrap();
        assert_eq!(admin_view, balances);
    }

    #[tokio::test]
    async fn test_deposit_approves_vault_then_deposits() {
        let f = fixture(true);
        let (_record, session) = logged_in(&f);
        f.node.set_nonce(4);
        let contracts = *f.service.contracts();
        let amount = U256::from(1_000_000u64);

        let outcome = f.service.deposit(&session, amount).await.unwrap();
        let sent = f.node.submitted();
        assert_eq!(sent.len(), 2);

        assert_eq!(sent[0].to, contracts.token);
        assert_eq!(sent[0].data, erc20::approve(contracts.token, contracts.vault, amount, 1).calldata().to_vec());
        assert_eq!(sent[1].to, contracts.vault);
        assert_eq!(sent[1].data, vault::deposit(contracts.vault, amount, 1).calldata().to_vec());
        assert_eq!(sent[1].nonce, sent[0].nonce + 1);
        assert_eq!(outcome.dependent_tx, sent[1].tx_id);
    }

    #[tokio::test]
    async fn test_swap_checks_token_balance() {
        let f = fixture(false);
        let (record, session) = logged_in(&f);
        let contracts = *f.service.contracts();
        f.node.set_call_result(contracts.token, erc20::balance_of_calldata(record.address), U256::from(10u64));

        let err = f.service.swap_to_native(&session, U256::from(11u64)).await.unwrap_err();
        assert!(matches!(err, WalletError::InsufficientFunds { .. }));
        assert!(f.node.submitted().is_empty());

        f.service.swap_to_native(&session, U256::from(10u64)).await.unwrap();
        let sent = f.node.submitted();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, contracts.router);
        assert_eq!(&sent[1].data[..4], &ethers::utils::id(router::EXACT_INPUT_SINGLE)[..]);
    }

    #[tokio::test]
    async fn test_single_step_operations() {
        let f = fixture(true);
        let (record, session) = logged_in(&f);
        let contracts = *f.service.contracts();
        let other = "0x000000000000000000000000000000000000dEaD";
        let other_addr = crypto::parse_address(other).unwrap();
        let amount = U256::from(5u64);

        f.service.withdraw(&session, amount).await.unwrap();
        f.service.withdraw_to(&session, other, amount).await.unwrap();
        f.service.send_token(&session, other, amount).await.unwrap();
        f.node.set_native_balance(record.address, U256::exp10(18));
        f.service.send_native(&session, other, amount).await.unwrap();

        let sent = f.node.submitted();
        assert_eq!(sent[0].data, vault::withdraw(contracts.vault, amount, 1).calldata().to_vec());
        assert_eq!(sent[1].data, vault::withdraw_to(contracts.vault, other_addr, amount, 1).calldata().to_vec());
        assert_eq!(sent[2].to, contracts.token);
        assert_eq!(sent[3].to, other_addr);
        assert_eq!(sent[3].value, amount);
        assert!(sent[3].data.is_empty());
        assert_eq!(CallSpec::native_transfer(other_addr, amount, 21_000).calldata().len(), 0);
    }

    #[tokio::test]
    async fn test_bad_input_sends_nothing() {
        let f = fixture(true);
        let (_record, session) = logged_in(&f);

        let zero = f.service.deposit(&session, U256::zero()).await;
        assert!(matches!(zero, Err(WalletError::InvalidInput(_))));

        let bad_to = f.service.send_token(&session, "0x1234", U256::one()).await;
        assert!(matches!(bad_to, Err(WalletError::InvalidAddress(_))));

        let broke = f.service.send_native(&session, "0x000000000000000000000000000000000000dEaD", U256::one()).await;
        assert!(matches!(broke, Err(WalletError::InsufficientFunds { .. })));

        assert!(f.node.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_status_and_wait() {
        let f = fixture(true);
        let (_record, session) = logged_in(&f);

        let tx_id = f.service.withdraw(&session, U256::one()).await.unwrap();
        assert!(matches!(f.service.status(tx_id).await.unwrap(), TxStatus::Confirmed(_)));
        let receipt = f.service.await_confirmation(tx_id).await.unwrap();
        assert!(receipt.succeeded);
    }
}
