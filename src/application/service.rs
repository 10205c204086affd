use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{
    Account, AccountField, AccountNumber, Amount, Pin, TRANSACTION_LIMIT, account_number,
    within_transaction_limit,
};
use crate::storage::AccountStore;

use super::AppError;

/// How many freshly generated numbers may collide before giving up.
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 16;

/// Application service providing the account-ledger operations.
/// This is the primary interface for any client (CLI, tests, a future UI).
///
/// Every mutation is staged on a copy of the collection, persisted, and only
/// then committed. The lock is held across the write, so a failed save leaves
/// the in-memory ledger untouched and concurrent callers cannot interleave.
pub struct LedgerService {
    store: AccountStore,
    accounts: Mutex<Vec<Account>>,
}

impl LedgerService {
    /// Create a service over an already loaded collection.
    pub fn new(store: AccountStore, accounts: Vec<Account>) -> Self {
        Self {
            store,
            accounts: Mutex::new(accounts),
        }
    }

    /// Open the ledger stored at `path`, creating an empty one if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = AccountStore::new(path);
        let accounts = store.load().await?;
        Ok(Self::new(store, accounts))
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    // ========================
    // Account lifecycle
    // ========================

    /// Open a new account with a zero balance.
    pub async fn create_account(
        &self,
        name: String,
        age: u32,
        email: String,
        pin: &str,
    ) -> Result<Account, AppError> {
        let pin = Pin::parse(pin)?;
        let mut accounts = self.accounts.lock().await;

        let number = fresh_account_number(&accounts, account_number::generate)?;
        let account = Account::open(name, age, email, number, pin)?;

        let mut staged = accounts.clone();
        staged.push(account.clone());
        self.commit(&mut accounts, staged).await?;

        info!(account_number = %account.account_number, "Account created");
        Ok(account)
    }

    /// Look up an account by number and PIN.
    pub async fn find_account(&self, account_number: &str, pin: &str) -> Result<Account, AppError> {
        let accounts = self.accounts.lock().await;
        let index = locate(&accounts, account_number, pin)?;
        Ok(accounts[index].clone())
    }

    /// Overwrite one field of an account.
    pub async fn update_field(
        &self,
        account_number: &str,
        pin: &str,
        field: AccountField,
        new_value: &str,
    ) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().await;
        let index = locate(&accounts, account_number, pin)?;

        let mut staged = accounts.clone();
        staged[index].update_field(field, new_value)?;
        let updated = staged[index].clone();
        self.commit(&mut accounts, staged).await?;

        info!(account_number, %field, "Account updated");
        Ok(updated)
    }

    /// Permanently remove an account. Returns the removed record.
    pub async fn delete_account(&self, account_number: &str, pin: &str) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().await;
        let index = locate(&accounts, account_number, pin)?;

        let mut staged = accounts.clone();
        let removed = staged.remove(index);
        self.commit(&mut accounts, staged).await?;

        info!(account_number, "Account deleted");
        Ok(removed)
    }

    /// Snapshot of every account, in the order they were opened.
    pub async fn list_accounts(&self) -> Vec<Account> {
        self.accounts.lock().await.clone()
    }

    // ========================
    // Money movement
    // ========================

    /// Add `amount` to the balance. The amount must be in `(0, TRANSACTION_LIMIT]`.
    pub async fn deposit(
        &self,
        account_number: &str,
        pin: &str,
        amount: Amount,
    ) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().await;
        let index = locate(&accounts, account_number, pin)?;

        if !within_transaction_limit(amount) {
            return Err(limit_exceeded(amount));
        }

        let mut staged = accounts.clone();
        let account = &mut staged[index];
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| limit_exceeded(amount))?;
        let updated = account.clone();
        self.commit(&mut accounts, staged).await?;

        info!(account_number, amount, balance = updated.balance, "Deposit recorded");
        Ok(updated)
    }

    /// Take `amount` from the balance.
    ///
    /// The limit check runs before the funds check, so an amount that breaks
    /// both is reported as `LimitExceeded`.
    pub async fn withdraw(
        &self,
        account_number: &str,
        pin: &str,
        amount: Amount,
    ) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().await;
        let index = locate(&accounts, account_number, pin)?;

        if !within_transaction_limit(amount) {
            return Err(limit_exceeded(amount));
        }

        let balance = accounts[index].balance;
        if amount > balance {
            return Err(AppError::InsufficientFunds {
                balance,
                required: amount,
            });
        }

        let mut staged = accounts.clone();
        staged[index].balance -= amount;
        let updated = staged[index].clone();
        self.commit(&mut accounts, staged).await?;

        info!(account_number, amount, balance = updated.balance, "Withdrawal recorded");
        Ok(updated)
    }

    /// Persist `staged` and, only if that succeeds, make it the live collection.
    async fn commit(&self, accounts: &mut Vec<Account>, staged: Vec<Account>) -> Result<(), AppError> {
        if let Err(err) = self.store.save_all(&staged).await {
            warn!(error = %format!("{err:#}"), "Persisting accounts failed, change discarded");
            return Err(AppError::StorageUnavailable(err));
        }
        *accounts = staged;
        Ok(())
    }
}

fn locate(accounts: &[Account], account_number: &str, pin: &str) -> Result<usize, AppError> {
    accounts
        .iter()
        .position(|a| a.matches(account_number, pin))
        .ok_or_else(|| AppError::NotFound(account_number.to_string()))
}

fn fresh_account_number(
    accounts: &[Account],
    mut next_candidate: impl FnMut() -> AccountNumber,
) -> Result<AccountNumber, AppError> {
    for attempt in 1..=MAX_ACCOUNT_NUMBER_ATTEMPTS {
        let candidate = next_candidate();
        if accounts.iter().all(|a| a.account_number != candidate) {
            return Ok(candidate);
        }
        warn!(attempt, "Generated account number already in use, retrying");
    }
    Err(AppError::AccountNumberExhausted(MAX_ACCOUNT_NUMBER_ATTEMPTS))
}

fn limit_exceeded(amount: Amount) -> AppError {
    AppError::LimitExceeded {
        amount,
        limit: TRANSACTION_LIMIT,
    }
}
