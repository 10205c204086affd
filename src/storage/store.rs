use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::domain::Account;

/// Flat-file store holding the full account list as a JSON array.
///
/// Every save rewrites the whole collection into `<file>.tmp` and renames it
/// over the real file, so readers only ever see the old or the new list.
pub struct AccountStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");

        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every persisted account.
    ///
    /// A missing file is an empty ledger: the file (and its parent
    /// directories) are created on the spot.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<Account>> {
        let exists = fs::try_exists(&self.path)
            .await
            .context("Failed to probe account file")?;

        if !exists {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create data directory")?;
            }
            self.save_all(&[]).await?;
            info!("No account file found, started an empty ledger");
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.path)
            .await
            .context("Failed to read account file")?;

        let accounts: Vec<Account> =
            serde_json::from_str(&json).context("Failed to parse account file")?;

        let mut seen = HashSet::with_capacity(accounts.len());
        for account in &accounts {
            account.check_invariants().with_context(|| {
                format!("Stored account {} is invalid", account.account_number)
            })?;
            if !seen.insert(account.account_number.as_str()) {
                bail!("Duplicate account number in store: {}", account.account_number);
            }
        }

        info!(accounts = accounts.len(), "Accounts loaded");
        Ok(accounts)
    }

    /// Replace the persisted collection with `accounts`.
    #[instrument(skip(self, accounts), fields(path = %self.path.display(), accounts = accounts.len()))]
    pub async fn save_all(&self, accounts: &[Account]) -> Result<()> {
        let json = serde_json::to_string_pretty(accounts).context("Failed to serialize accounts")?;

        let replaced = match self.write_tmp(json.as_bytes()).await {
            Ok(()) => fs::rename(&self.tmp_path, &self.path)
                .await
                .context("Failed to replace account file"),
            Err(err) => Err(err),
        };

        if let Err(err) = replaced {
            // Best effort; the live file was never touched.
            if let Err(cleanup) = fs::remove_file(&self.tmp_path).await {
                debug!(error = %cleanup, "Could not remove temporary account file");
            }
            return Err(err);
        }

        debug!("Accounts saved");
        Ok(())
    }

    async fn write_tmp(&self, contents: &[u8]) -> Result<()> {
        let mut file = fs::File::create(&self.tmp_path)
            .await
            .context("Failed to create temporary account file")?;
        file.write_all(contents)
            .await
            .context("Failed to write temporary account file")?;
        file.sync_all()
            .await
            .context("Failed to sync temporary account file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pin;
    use tempfile::TempDir;

    fn account(number: &str, balance: i64) -> Account {
        let mut account = Account::open(
            "Grace".into(),
            52,
            "grace@example.com".into(),
            number.into(),
            Pin::parse("2468").unwrap(),
        )
        .unwrap();
        account.balance = balance;
        account
    }

    #[test]
    fn test_tmp_path_is_a_sibling() {
        let store = AccountStore::new("/var/lib/bank/data.json");
        assert_eq!(store.tmp_path, PathBuf::from("/var/lib/bank/data.json.tmp"));
    }

    #[tokio::test]
    async fn test_missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let store = AccountStore::new(&path);

        let accounts = store.load().await.unwrap();
        assert!(accounts.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_save_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(dir.path().join("data.json"));

        store.save_all(&[account("abc1234567890!", 10)]).await.unwrap();
        assert!(!store.tmp_path.exists());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        // A non-empty directory in place of the data file makes the rename fail.
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let store = AccountStore::new(&path);

        let err = store.save_all(&[account("abc1234567890!", 0)]).await.unwrap_err();
        assert!(err.to_string().contains("Failed to replace account file"));
        assert!(!store.tmp_path.exists());
        assert!(path.join("occupied").is_dir());
    }

    #[tokio::test]
    async fn test_duplicate_numbers_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(dir.path().join("data.json"));

        let dup = account("abc1234567890!", 0);
        store.save_all(&[dup.clone(), dup]).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("Duplicate account number"));
    }

    #[tokio::test]
    async fn test_negative_balance_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(dir.path().join("data.json"));

        store.save_all(&[account("abc1234567890!", -5)]).await.unwrap();
        assert!(store.load().await.is_err());
    }
}
