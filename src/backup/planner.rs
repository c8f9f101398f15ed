// Computes the per-entity action plan for a restore before anything is
// written.
//
// Accounts are matched by (server-URL host, username); collections within a
// matched account are matched by URL. A matched account with
// `overwrite_existing == false` is skipped as a whole subtree so that a
// "skipped" account never has its collections silently rewritten.

use log::debug;

use crate::models::{Account, Collection};

use super::document::{AccountSnapshot, BackupDocument, CollectionSnapshot, SettingsSnapshot};

/// A local account together with its collections, pre-fetched by the caller.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub account: Account,
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction {
    Create {
        snapshot: CollectionSnapshot,
    },
    Update {
        local_id: i64,
        snapshot: CollectionSnapshot,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountAction {
    /// No local match: the account and every nested collection are created.
    Create { snapshot: AccountSnapshot },
    /// Local match with overwrite: the local id is retained and each
    /// collection is independently created or updated.
    Update {
        local: Account,
        snapshot: AccountSnapshot,
        collections: Vec<CollectionAction>,
    },
    /// Local match without overwrite: the whole subtree is left untouched.
    Skip { account_name: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestorePlan {
    pub account_actions: Vec<AccountAction>,
    pub settings_action: Option<SettingsSnapshot>,
}

pub fn plan(
    document: &BackupDocument,
    local: &[LocalAccount],
    overwrite_existing: bool,
) -> RestorePlan {
    let mut account_actions = Vec::with_capacity(document.accounts.len());

    for snapshot in &document.accounts {
        let identity = snapshot.identity();
        let matched = local.iter().find(|l| l.account.identity() == identity);

        let action = match matched {
            None => {
                debug!("Planned create for account '{}'", snapshot.account_name);
                AccountAction::Create {
                    snapshot: snapshot.clone(),
                }
            }
            Some(_) if !overwrite_existing => {
                debug!("Planned skip for existing account '{}'", snapshot.account_name);
                AccountAction::Skip {
                    account_name: snapshot.account_name.clone(),
                }
            }
            Some(existing) => {
                let collections = plan_collections(snapshot, &existing.collections);
                debug!(
                    "Planned update for account '{}' ({} collection actions)",
                    snapshot.account_name,
                    collections.len()
                );
                AccountAction::Update {
                    local: existing.account.clone(),
                    snapshot: snapshot.clone(),
                    collections,
                }
            }
        };
        account_actions.push(action);
    }

    RestorePlan {
        account_actions,
        settings_action: document.settings.clone(),
    }
}

fn plan_collections(
    snapshot: &AccountSnapshot,
    local_collections: &[Collection],
) -> Vec<CollectionAction> {
    snapshot
        .collections
        .iter()
        .map(|collection| {
            let matched = local_collections
                .iter()
                .find(|local| local.url == collection.url);
            match matched.and_then(|local| local.id) {
                Some(local_id) => CollectionAction::Update {
                    local_id,
                    snapshot: collection.clone(),
                },
                None => CollectionAction::Create {
                    snapshot: collection.clone(),
                },
            }
        })
        .collect()
}
