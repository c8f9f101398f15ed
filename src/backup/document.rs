// The portable backup document and its conversions to and from local records.
//
// Snapshot types deliberately have no field for passwords, credential
// references or certificate private material: a document cannot leak what it
// cannot represent.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::models::account::identity_key;
use crate::models::{Account, AppSettings, Collection, CollectionKind};

/// Structural version of the document format. Bumped whenever a release
/// changes the shape; decoders reject anything newer than this.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub schema_version: u32,
    /// Export instant, epoch milliseconds.
    pub created_at: i64,
    pub accounts: Vec<AccountSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub account_name: String,
    pub server_url: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_fingerprint: Option<String>,
    pub collections: Vec<CollectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    pub url: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    pub sync_enabled: bool,
    pub visible: bool,
    pub wifi_only_sync: bool,
    pub force_read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_events_older_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub auto_sync: bool,
    pub wifi_only_sync: bool,
    pub dark_mode: bool,
    pub debug_logging: bool,
}

impl AccountSnapshot {
    pub fn from_record(account: &Account, collections: Vec<CollectionSnapshot>) -> Self {
        Self {
            account_name: account.account_name.clone(),
            server_url: account.server_url.clone(),
            username: account.username.clone(),
            certificate_fingerprint: account.certificate_fingerprint.clone(),
            collections,
        }
    }

    /// Local record for this snapshot. When `existing` is given, its id and
    /// credential reference are retained; a fresh account has neither and the
    /// user re-authenticates after restore.
    pub fn to_record(&self, existing: Option<&Account>) -> Account {
        Account {
            id: existing.and_then(|a| a.id),
            account_name: self.account_name.clone(),
            server_url: self.server_url.clone(),
            username: self.username.clone(),
            credential_ref: existing.and_then(|a| a.credential_ref.clone()),
            certificate_fingerprint: self.certificate_fingerprint.clone(),
        }
    }

    pub fn identity(&self) -> (String, String) {
        identity_key(&self.server_url, &self.username)
    }
}

impl CollectionSnapshot {
    pub fn from_record(collection: &Collection) -> Result<Self> {
        let kind = CollectionKind::parse(&collection.kind).ok_or_else(|| {
            anyhow!(
                "collection '{}' has unknown kind '{}'",
                collection.url,
                collection.kind
            )
        })?;

        Ok(Self {
            kind,
            url: collection.url.clone(),
            display_name: collection.display_name.clone(),
            color: collection.color,
            sync_enabled: collection.sync_enabled,
            visible: collection.visible,
            wifi_only_sync: collection.wifi_only_sync,
            force_read_only: collection.force_read_only,
            skip_events_older_days: collection.skip_events_older_days,
        })
    }

    pub fn to_record(&self, account_id: i64, existing_id: Option<i64>) -> Collection {
        Collection {
            id: existing_id,
            account_id,
            kind: self.kind.as_str().to_string(),
            url: self.url.clone(),
            display_name: self.display_name.clone(),
            color: self.color,
            sync_enabled: self.sync_enabled,
            visible: self.visible,
            wifi_only_sync: self.wifi_only_sync,
            force_read_only: self.force_read_only,
            skip_events_older_days: self.skip_events_older_days,
        }
    }
}

impl From<AppSettings> for SettingsSnapshot {
    fn from(settings: AppSettings) -> Self {
        Self {
            auto_sync: settings.auto_sync,
            wifi_only_sync: settings.wifi_only_sync,
            dark_mode: settings.dark_mode,
            debug_logging: settings.debug_logging,
        }
    }
}

impl SettingsSnapshot {
    pub fn to_settings(&self) -> AppSettings {
        AppSettings {
            auto_sync: self.auto_sync,
            wifi_only_sync: self.wifi_only_sync,
            dark_mode: self.dark_mode,
            debug_logging: self.debug_logging,
        }
    }
}
