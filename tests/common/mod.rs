// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use onebank::Account;
use onebank::application::LedgerService;
use tempfile::TempDir;

pub const PIN: &str = "1234";

/// Helper to create a test service over a temporary data file
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(data_path(&temp_dir)).await?;
    Ok((service, temp_dir))
}

pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("data.json")
}

/// Open a standard adult account with PIN `1234`
pub async fn open_account(service: &LedgerService, name: &str) -> Result<Account> {
    let account = service
        .create_account(name.into(), 30, format!("{}@example.com", name.to_lowercase()), PIN)
        .await?;
    Ok(account)
}

/// Open an account and deposit `amount` into it
pub async fn funded_account(service: &LedgerService, name: &str, amount: i64) -> Result<Account> {
    let account = open_account(service, name).await?;
    let account = service.deposit(&account.account_number, PIN, amount).await?;
    Ok(account)
}
