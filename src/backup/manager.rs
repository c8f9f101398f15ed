// Public boundary of the backup core.
//
// Everything below this facade reports typed errors; here they all collapse
// into the two result shapes the presentation layer renders. A restore that
// fails to decode returns before a single repository write happens.

use log::info;
use serde::Serialize;

use crate::error::AppResult;
use crate::utils::logging::log_error_with_context;

use super::builder::{BackupScope, SnapshotBuilder};
use super::codec;
use super::executor::{RestoreExecutor, RestoreSummary};
use super::planner::{self, LocalAccount};
use super::repository::{AccountRepository, CollectionRepository, SettingsStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BackupResult {
    Success { json: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RestoreResult {
    Success { summary: RestoreSummary },
    Error { message: String },
}

pub struct BackupRestoreManager<A, C, S> {
    accounts: A,
    collections: C,
    settings: S,
}

impl<A, C, S> BackupRestoreManager<A, C, S>
where
    A: AccountRepository,
    C: CollectionRepository,
    S: SettingsStore,
{
    pub fn new(accounts: A, collections: C, settings: S) -> Self {
        Self {
            accounts,
            collections,
            settings,
        }
    }

    /// Backup of one account. App-wide settings are not included; use
    /// [`backup_with`](Self::backup_with) to choose differently.
    pub async fn create_backup(&self, account_id: i64) -> BackupResult {
        self.backup_with(BackupScope::Account(account_id), false)
            .await
    }

    /// Backup of every account plus the app-wide settings.
    pub async fn create_full_backup(&self) -> BackupResult {
        self.backup_with(BackupScope::All, true).await
    }

    pub async fn backup_with(&self, scope: BackupScope, include_settings: bool) -> BackupResult {
        match self.export(scope, include_settings).await {
            Ok(json) => {
                info!("Backup created ({} bytes)", json.len());
                BackupResult::Success { json }
            }
            Err(e) => {
                log_error_with_context(&e, "backup");
                BackupResult::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn export(&self, scope: BackupScope, include_settings: bool) -> AppResult<String> {
        let builder = SnapshotBuilder::new(&self.accounts, &self.collections, &self.settings);
        let document = builder.build(scope, include_settings).await?;
        Ok(codec::encode(&document)?)
    }

    pub async fn restore_backup(&self, json: &str, overwrite_existing: bool) -> RestoreResult {
        match self.import(json, overwrite_existing).await {
            Ok(summary) => {
                info!(
                    "Restore finished: {} accounts, {} collections, settings: {}, {} failed",
                    summary.accounts_restored,
                    summary.collections_restored,
                    if summary.settings_restored { "yes" } else { "no" },
                    summary.errors.len()
                );
                RestoreResult::Success { summary }
            }
            Err(e) => {
                log_error_with_context(&e, "restore");
                RestoreResult::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Decoding and local-state reads happen before any write; a document
    /// that does not decode leaves local state byte-for-byte unchanged.
    async fn import(&self, json: &str, overwrite_existing: bool) -> AppResult<RestoreSummary> {
        let document = codec::decode(json)?;
        let local = self.load_local_state().await?;

        let plan = planner::plan(&document, &local, overwrite_existing);
        let executor = RestoreExecutor::new(&self.accounts, &self.collections, &self.settings);
        Ok(executor.apply(&plan).await)
    }

    async fn load_local_state(&self) -> anyhow::Result<Vec<LocalAccount>> {
        let mut local = Vec::new();
        for account in self.accounts.get_all().await? {
            let collections = match account.id {
                Some(id) => self.collections.get_for_account(id).await?,
                None => Vec::new(),
            };
            local.push(LocalAccount {
                account,
                collections,
            });
        }
        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::document::SCHEMA_VERSION;
    use crate::backup::repository::memory::MemoryStore;
    use crate::models::{Account, Collection, CollectionKind};
    use std::sync::Arc;

    fn manager(
        store: &Arc<MemoryStore>,
    ) -> BackupRestoreManager<Arc<MemoryStore>, Arc<MemoryStore>, Arc<MemoryStore>> {
        BackupRestoreManager::new(store.clone(), store.clone(), store.clone())
    }

    fn seed_work_account(store: &MemoryStore) -> i64 {
        let mut account = Account::new(
            "Work".to_string(),
            "https://dav.example.com".to_string(),
            "alice".to_string(),
        );
        account.credential_ref = Some("keychain://opendav/1".to_string());
        let id = store.insert_account(account);

        for (kind, url, name) in [
            (CollectionKind::Calendar, "https://dav.example.com/cal/work", "Work"),
            (CollectionKind::Calendar, "https://dav.example.com/cal/family", "Family"),
            (
                CollectionKind::AddressBook,
                "https://dav.example.com/card/contacts",
                "Contacts",
            ),
        ] {
            store.insert_collection(Collection::new(
                id,
                kind,
                url.to_string(),
                name.to_string(),
            ));
        }
        id
    }

    #[tokio::test]
    async fn test_create_backup_unknown_account_is_error() {
        let store = Arc::new(MemoryStore::new());
        let result = manager(&store).create_backup(99).await;
        assert!(matches!(result, BackupResult::Error { .. }));
    }

    #[tokio::test]
    async fn test_create_backup_contains_account_and_collections() {
        let store = Arc::new(MemoryStore::new());
        let id = seed_work_account(&store);

        let result = manager(&store).create_backup(id).await;
        let json = match result {
            BackupResult::Success { json } => json,
            BackupResult::Error { message } => panic!("backup failed: {}", message),
        };

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["accounts"].as_array().unwrap().len(), 1);
        assert_eq!(
            value["accounts"][0]["collections"].as_array().unwrap().len(),
            3
        );
        assert!(!json.to_lowercase().contains("password"));
        assert!(value.get("settings").is_none());
    }

    #[tokio::test]
    async fn test_full_backup_includes_settings() {
        let store = Arc::new(MemoryStore::new());
        seed_work_account(&store);

        let result = manager(&store).create_full_backup().await;
        let json = match result {
            BackupResult::Success { json } => json,
            BackupResult::Error { message } => panic!("backup failed: {}", message),
        };

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("settings").is_some());
    }

    #[tokio::test]
    async fn test_restore_malformed_json_mutates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let result = manager(&store).restore_backup("{ nope", false).await;

        assert!(matches!(result, RestoreResult::Error { .. }));
        assert!(store.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_newer_schema_mutates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let json = format!(
            r#"{{"schemaVersion": {}, "createdAt": 0, "accounts": [{{"accountName": "X", "serverUrl": "https://x", "username": "u", "collections": []}}]}}"#,
            SCHEMA_VERSION + 5
        );

        let result = manager(&store).restore_backup(&json, true).await;
        match result {
            RestoreResult::Error { message } => assert!(message.contains("newer")),
            other => panic!("expected error, got {:?}", other),
        }
        assert!(store.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backup_restore_cycle_skip_then_overwrite() {
        let store = Arc::new(MemoryStore::new());
        let id = seed_work_account(&store);
        let mgr = manager(&store);

        let json = match mgr.create_backup(id).await {
            BackupResult::Success { json } => json,
            BackupResult::Error { message } => panic!("backup failed: {}", message),
        };

        // Same data already present: everything is skipped.
        let skipped = mgr.restore_backup(&json, false).await;
        match skipped {
            RestoreResult::Success { summary } => {
                assert_eq!(summary.accounts_restored, 0);
                assert_eq!(summary.collections_restored, 0);
                assert!(summary.errors.is_empty());
            }
            other => panic!("expected success, got {:?}", other),
        }

        // Overwrite counts the update even though nothing changed.
        let overwritten = mgr.restore_backup(&json, true).await;
        match overwritten {
            RestoreResult::Success { summary } => {
                assert_eq!(summary.accounts_restored, 1);
                assert_eq!(summary.collections_restored, 3);
            }
            other => panic!("expected success, got {:?}", other),
        }

        // Credential survives the overwrite.
        let account = store.account_by_name("Work").unwrap();
        assert_eq!(
            account.credential_ref,
            Some("keychain://opendav/1".to_string())
        );
    }

    #[tokio::test]
    async fn test_result_shapes_serialize_for_the_shell() {
        let result = BackupResult::Error {
            message: "boom".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"error\""));

        let summary = RestoreSummary::default();
        let result = RestoreResult::Success { summary };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"accountsRestored\":0"));
    }
}
