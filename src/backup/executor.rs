// Applies a restore plan, account by account.
//
// Accounts are processed sequentially and isolated from each other: the
// first failure inside one account marks that account failed and execution
// moves on to the next. Within one account the record itself is always
// written before its collections, so an account whose persistence is refused
// leaves no trace.

use log::{debug, warn};
use serde::Serialize;

use super::planner::{AccountAction, CollectionAction, RestorePlan};
use super::repository::{AccountRepository, CollectionRepository, SettingsStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerAccountError {
    pub account_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub accounts_restored: usize,
    pub collections_restored: usize,
    pub settings_restored: bool,
    pub errors: Vec<PerAccountError>,
}

pub struct RestoreExecutor<'a, A, C, S> {
    accounts: &'a A,
    collections: &'a C,
    settings: &'a S,
}

impl<'a, A, C, S> RestoreExecutor<'a, A, C, S>
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

    pub async fn apply(&self, plan: &RestorePlan) -> RestoreSummary {
        let mut summary = RestoreSummary::default();

        for action in &plan.account_actions {
            match action {
                AccountAction::Skip { account_name } => {
                    debug!("Leaving account '{}' untouched", account_name);
                }
                AccountAction::Create { snapshot } => {
                    debug!("Applying planned create for account '{}'", snapshot.account_name);
                    match self.apply_create(snapshot).await {
                        Ok(collections) => {
                            debug!("Account '{}' committed", snapshot.account_name);
                            summary.accounts_restored += 1;
                            summary.collections_restored += collections;
                        }
                        Err(e) => {
                            warn!("Account '{}' failed: {}", snapshot.account_name, e);
                            summary.errors.push(PerAccountError {
                                account_name: snapshot.account_name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                AccountAction::Update {
                    local,
                    snapshot,
                    collections,
                } => {
                    debug!("Applying planned update for account '{}'", snapshot.account_name);
                    match self.apply_update(local, snapshot, collections).await {
                        Ok(restored) => {
                            debug!("Account '{}' committed", snapshot.account_name);
                            summary.accounts_restored += 1;
                            summary.collections_restored += restored;
                        }
                        Err(e) => {
                            warn!("Account '{}' failed: {}", snapshot.account_name, e);
                            summary.errors.push(PerAccountError {
                                account_name: snapshot.account_name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(snapshot) = &plan.settings_action {
            match self.settings.write(&snapshot.to_settings()).await {
                Ok(()) => summary.settings_restored = true,
                Err(e) => {
                    warn!("Settings restore failed: {}", e);
                    summary.errors.push(PerAccountError {
                        account_name: "settings".to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    async fn apply_create(
        &self,
        snapshot: &super::document::AccountSnapshot,
    ) -> anyhow::Result<usize> {
        let account_id = self.accounts.upsert(&snapshot.to_record(None)).await?;

        for collection in &snapshot.collections {
            self.collections
                .upsert(&collection.to_record(account_id, None))
                .await?;
        }
        Ok(snapshot.collections.len())
    }

    async fn apply_update(
        &self,
        local: &crate::models::Account,
        snapshot: &super::document::AccountSnapshot,
        collections: &[CollectionAction],
    ) -> anyhow::Result<usize> {
        let account_id = self.accounts.upsert(&snapshot.to_record(Some(local))).await?;

        for action in collections {
            match action {
                CollectionAction::Create { snapshot } => {
                    self.collections
                        .upsert(&snapshot.to_record(account_id, None))
                        .await?;
                }
                CollectionAction::Update { local_id, snapshot } => {
                    self.collections
                        .upsert(&snapshot.to_record(account_id, Some(*local_id)))
                        .await?;
                }
            }
        }
        Ok(collections.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::document::{AccountSnapshot, BackupDocument, CollectionSnapshot, SCHEMA_VERSION};
    use crate::backup::planner::{self, LocalAccount};
    use crate::backup::repository::memory::MemoryStore;
    use crate::models::{Account, AppSettings, Collection, CollectionKind};

    fn account_snapshot(name: &str, username: &str, collection_urls: &[&str]) -> AccountSnapshot {
        AccountSnapshot {
            account_name: name.to_string(),
            server_url: "https://dav.example.com".to_string(),
            username: username.to_string(),
            certificate_fingerprint: None,
            collections: collection_urls
                .iter()
                .map(|url| CollectionSnapshot {
                    kind: CollectionKind::Calendar,
                    url: url.to_string(),
                    display_name: "Cal".to_string(),
                    color: None,
                    sync_enabled: true,
                    visible: true,
                    wifi_only_sync: false,
                    force_read_only: false,
                    skip_events_older_days: None,
                })
                .collect(),
        }
    }

    fn document(accounts: Vec<AccountSnapshot>) -> BackupDocument {
        BackupDocument {
            schema_version: SCHEMA_VERSION,
            created_at: 0,
            accounts,
            settings: None,
        }
    }

    #[tokio::test]
    async fn test_create_accounts_and_collections() {
        let store = MemoryStore::new();
        let doc = document(vec![account_snapshot(
            "Work",
            "alice",
            &["https://dav.example.com/cal/a", "https://dav.example.com/cal/b"],
        )]);
        let plan = planner::plan(&doc, &[], false);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 1);
        assert_eq!(summary.collections_restored, 2);
        assert!(!summary.settings_restored);
        assert!(summary.errors.is_empty());

        let stored = store.account_by_name("Work").unwrap();
        assert_eq!(stored.credential_ref, None);
        assert_eq!(store.collections_for(stored.id.unwrap()).len(), 2);
    }

    #[tokio::test]
    async fn test_skip_increments_nothing() {
        let store = MemoryStore::new();
        let plan = RestorePlan {
            account_actions: vec![AccountAction::Skip {
                account_name: "Work".to_string(),
            }],
            settings_action: None,
        };

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 0);
        assert_eq!(summary.collections_restored, 0);
        assert!(summary.errors.is_empty());
        assert!(store.accounts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_preserves_credential_ref_and_counts() {
        let store = MemoryStore::new();
        let mut existing = Account::new(
            "Work".to_string(),
            "https://dav.example.com".to_string(),
            "alice".to_string(),
        );
        existing.credential_ref = Some("keychain://opendav/1".to_string());
        let id = store.insert_account(existing);

        let doc = document(vec![account_snapshot(
            "Work (restored)",
            "alice",
            &["https://dav.example.com/cal/a"],
        )]);
        let local = vec![LocalAccount {
            account: store.account_by_name("Work").unwrap(),
            collections: Vec::new(),
        }];
        let plan = planner::plan(&doc, &local, true);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 1);
        assert_eq!(summary.collections_restored, 1);

        let updated = store.account_by_name("Work (restored)").unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(
            updated.credential_ref,
            Some("keychain://opendav/1".to_string())
        );
    }

    #[tokio::test]
    async fn test_failing_account_is_isolated() {
        let store = MemoryStore::new();
        store
            .fail_account_upserts
            .lock()
            .unwrap()
            .insert("B".to_string());

        let doc = document(vec![
            account_snapshot("A", "alice", &["https://dav.example.com/a/cal"]),
            account_snapshot("B", "bob", &["https://dav.example.com/b/cal"]),
            account_snapshot("C", "carol", &["https://dav.example.com/c/cal"]),
        ]);
        let plan = planner::plan(&doc, &[], false);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 2);
        assert_eq!(summary.collections_restored, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].account_name, "B");

        // B left no trace; A and C committed in full.
        assert!(store.account_by_name("B").is_none());
        assert!(store.account_by_name("A").is_some());
        assert!(store.account_by_name("C").is_some());
    }

    #[tokio::test]
    async fn test_failing_collection_fails_its_account_only() {
        let store = MemoryStore::new();
        store
            .fail_collection_upserts
            .lock()
            .unwrap()
            .insert("https://dav.example.com/a/bad".to_string());

        let doc = document(vec![
            account_snapshot("A", "alice", &["https://dav.example.com/a/bad"]),
            account_snapshot("B", "bob", &["https://dav.example.com/b/cal"]),
        ]);
        let plan = planner::plan(&doc, &[], false);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 1);
        assert_eq!(summary.collections_restored, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].account_name, "A");
    }

    #[tokio::test]
    async fn test_settings_failure_is_reported_not_fatal() {
        let store = MemoryStore::new();
        *store.fail_settings_write.lock().unwrap() = true;

        let mut doc = document(vec![account_snapshot("A", "alice", &[])]);
        doc.settings = Some(AppSettings::default().into());
        let plan = planner::plan(&doc, &[], false);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert_eq!(summary.accounts_restored, 1);
        assert!(!summary.settings_restored);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].account_name, "settings");
    }

    #[tokio::test]
    async fn test_settings_applied_when_present() {
        let store = MemoryStore::new();
        let mut doc = document(Vec::new());
        doc.settings = Some(
            AppSettings {
                auto_sync: false,
                wifi_only_sync: true,
                dark_mode: false,
                debug_logging: true,
            }
            .into(),
        );
        let plan = planner::plan(&doc, &[], false);

        let executor = RestoreExecutor::new(&store, &store, &store);
        let summary = executor.apply(&plan).await;

        assert!(summary.settings_restored);
        assert!(!store.settings.lock().unwrap().auto_sync);
        assert!(store.settings.lock().unwrap().debug_logging);
    }

    #[tokio::test]
    async fn test_update_collection_keeps_local_id() {
        let store = MemoryStore::new();
        let account = Account::new(
            "Work".to_string(),
            "https://dav.example.com".to_string(),
            "alice".to_string(),
        );
        let account_id = store.insert_account(account);
        let collection_id = store.insert_collection(Collection::new(
            account_id,
            CollectionKind::Calendar,
            "https://dav.example.com/cal/a".to_string(),
            "Old name".to_string(),
        ));

        let doc = document(vec![account_snapshot(
            "Work",
            "alice",
            &["https://dav.example.com/cal/a"],
        )]);
        let local = vec![LocalAccount {
            account: store.account_by_name("Work").unwrap(),
            collections: store.collections_for(account_id),
        }];
        let plan = planner::plan(&doc, &local, true);

        let executor = RestoreExecutor::new(&store, &store, &store);
        executor.apply(&plan).await;

        let collections = store.collections_for(account_id);
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].id, Some(collection_id));
        assert_eq!(collections[0].display_name, "Cal");
    }
}
