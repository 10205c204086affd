use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{Account, Amount};

/// An account as it leaves the ledger. The PIN is never exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedAccount {
    pub account_number: String,
    pub name: String,
    pub age: u32,
    pub email: String,
    pub balance: Amount,
}

impl From<&Account> for ExportedAccount {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            name: account.name.clone(),
            age: account.age,
            email: account.email.clone(),
            balance: account.balance,
        }
    }
}

/// Point-in-time snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<ExportedAccount>,
}

/// Exporter for converting ledger data to various formats.
/// Reads every account without credentials, so it is for operators only.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export accounts to CSV format
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account_number", "name", "age", "email", "balance"])?;

        for account in &accounts {
            csv_writer.write_record([
                account.account_number.as_str(),
                account.name.as_str(),
                account.age.to_string().as_str(),
                account.email.as_str(),
                account.balance.to_string().as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export accounts as a JSON snapshot
    pub async fn export_accounts_json<W: Write>(&self, mut writer: W) -> Result<AccountsSnapshot> {
        let accounts = self.service.list_accounts().await;

        let snapshot = AccountsSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: accounts.iter().map(ExportedAccount::from).collect(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
