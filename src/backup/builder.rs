// Assembles a fresh backup document from the current local state.

use chrono::Utc;
use log::debug;

use crate::error::{AppError, AppResult};

use super::document::{AccountSnapshot, BackupDocument, CollectionSnapshot, SCHEMA_VERSION};
use super::repository::{AccountRepository, CollectionRepository, SettingsStore};

/// What an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupScope {
    /// One account by local id.
    Account(i64),
    /// Every configured account.
    All,
}

pub struct SnapshotBuilder<'a, A, C, S> {
    accounts: &'a A,
    collections: &'a C,
    settings: &'a S,
}

impl<'a, A, C, S> SnapshotBuilder<'a, A, C, S>
where
    A: AccountRepository,
    C: CollectionRepository,
    S: SettingsStore,
{
    pub fn new(accounts: &'a A, collections: &'a C, settings: &'a S) -> Self {
        Self {
            accounts,
            collections,
            settings,
        }
    }

    /// Reads accounts and collections sequentially and assembles the
    /// document. Credentials and certificate private material never make it
    /// in: the snapshot types cannot carry them.
    pub async fn build(&self, scope: BackupScope, include_settings: bool) -> AppResult<BackupDocument> {
        let records = match scope {
            BackupScope::Account(id) => {
                let account = self
                    .accounts
                    .get_by_id(id)
                    .await?
                    .ok_or(AppError::IncompleteData(id))?;
                vec![account]
            }
            BackupScope::All => self.accounts.get_all().await?,
        };

        let mut snapshots = Vec::with_capacity(records.len());
        for account in &records {
            let id = account
                .id
                .ok_or_else(|| anyhow::anyhow!("account '{}' has no local id", account.account_name))?;

            let collections = self.collections.get_for_account(id).await?;
            let mut collection_snapshots = Vec::with_capacity(collections.len());
            for collection in &collections {
                collection_snapshots.push(CollectionSnapshot::from_record(collection)?);
            }

            debug!(
                "Snapshotting account '{}' with {} collections",
                account.account_name,
                collection_snapshots.len()
            );
            snapshots.push(AccountSnapshot::from_record(account, collection_snapshots));
        }

        let settings = if include_settings {
            Some(self.settings.read().await?.into())
        } else {
            None
        };

        Ok(BackupDocument {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now().timestamp_millis(),
            accounts: snapshots,
            settings,
        })
    }
}
