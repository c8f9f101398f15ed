// JSON codec for the backup document.
//
// Encoding goes through serde. Decoding walks the parsed `serde_json::Value`
// by hand so that the failure modes are exact: unknown extra fields are
// ignored, any missing mandatory field fails the whole decode, and a version
// from a newer release is rejected before anything else is looked at.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::CollectionKind;

use super::document::{
    AccountSnapshot, BackupDocument, CollectionSnapshot, SettingsSnapshot, SCHEMA_VERSION,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Backup is not valid JSON: {0}")]
    MalformedText(String),

    #[error(
        "Backup was created by a newer app version (schema {0}, supported up to {SCHEMA_VERSION}); update the app to restore it"
    )]
    UnsupportedSchemaVersion(u32),

    #[error("Backup is missing required field `{0}`")]
    MissingRequiredField(String),

    #[error("Backup field `{name}` is invalid: {detail}")]
    InvalidField { name: String, detail: String },
}

pub fn encode(document: &BackupDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

pub fn decode(text: &str) -> Result<BackupDocument, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::MalformedText(e.to_string()))?;
    let root = value
        .as_object()
        .ok_or_else(|| DecodeError::MalformedText("top level is not an object".to_string()))?;

    // Version gate comes first; nothing else in a newer document is trusted.
    let schema_version = require_u32(root, "schemaVersion", "schemaVersion")?;
    if schema_version > SCHEMA_VERSION {
        return Err(DecodeError::UnsupportedSchemaVersion(schema_version));
    }

    let created_at = require_i64(root, "createdAt", "createdAt")?;

    let accounts_value = require(root, "accounts", "accounts")?;
    let accounts_array = accounts_value.as_array().ok_or_else(|| invalid(
        "accounts",
        "expected an array",
    ))?;

    let mut accounts = Vec::with_capacity(accounts_array.len());
    for (index, entry) in accounts_array.iter().enumerate() {
        let path = format!("accounts[{}]", index);
        accounts.push(decode_account(entry, &path)?);
    }

    let settings = match root.get("settings") {
        None | Some(Value::Null) => None,
        Some(value) => Some(decode_settings(value)?),
    };

    Ok(BackupDocument {
        schema_version,
        created_at,
        accounts,
        settings,
    })
}

fn decode_account(value: &Value, path: &str) -> Result<AccountSnapshot, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))?;

    let account_name = require_str(object, "accountName", path)?;
    let server_url = require_str(object, "serverUrl", path)?;
    let username = require_str(object, "username", path)?;
    let certificate_fingerprint = optional_str(object, "certificateFingerprint", path)?;

    let collections_path = format!("{}.collections", path);
    let collections_value = require(object, "collections", path)?;
    let collections_array = collections_value
        .as_array()
        .ok_or_else(|| invalid(&collections_path, "expected an array"))?;

    let mut collections = Vec::with_capacity(collections_array.len());
    for (index, entry) in collections_array.iter().enumerate() {
        let entry_path = format!("{}[{}]", collections_path, index);
        collections.push(decode_collection(entry, &entry_path)?);
    }

    Ok(AccountSnapshot {
        account_name,
        server_url,
        username,
        certificate_fingerprint,
        collections,
    })
}

fn decode_collection(value: &Value, path: &str) -> Result<CollectionSnapshot, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))?;

    let kind_text = require_str(object, "type", path)?;
    let kind = CollectionKind::parse(&kind_text).ok_or_else(|| DecodeError::InvalidField {
        name: format!("{}.type", path),
        detail: format!("unknown collection type `{}`", kind_text),
    })?;

    Ok(CollectionSnapshot {
        kind,
        url: require_str(object, "url", path)?,
        display_name: require_str(object, "displayName", path)?,
        color: optional_i64(object, "color", path)?,
        sync_enabled: require_bool(object, "syncEnabled", path)?,
        visible: require_bool(object, "visible", path)?,
        wifi_only_sync: require_bool(object, "wifiOnlySync", path)?,
        force_read_only: require_bool(object, "forceReadOnly", path)?,
        skip_events_older_days: optional_i64(object, "skipEventsOlderDays", path)?,
    })
}

fn decode_settings(value: &Value) -> Result<SettingsSnapshot, DecodeError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid("settings", "expected an object"))?;

    // Individual toggles default when absent; a half-written settings block
    // should not sink the whole document.
    let defaults = SettingsSnapshot::from(crate::models::AppSettings::default());
    Ok(SettingsSnapshot {
        auto_sync: optional_bool(object, "autoSync", "settings", defaults.auto_sync)?,
        wifi_only_sync: optional_bool(
            object,
            "wifiOnlySync",
            "settings",
            defaults.wifi_only_sync,
        )?,
        dark_mode: optional_bool(object, "darkMode", "settings", defaults.dark_mode)?,
        debug_logging: optional_bool(
            object,
            "debugLogging",
            "settings",
            defaults.debug_logging,
        )?,
    })
}

fn field_name(parent: &str, key: &str) -> String {
    if parent == key {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn invalid(name: &str, detail: &str) -> DecodeError {
    DecodeError::InvalidField {
        name: name.to_string(),
        detail: detail.to_string(),
    }
}

fn require<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<&'a Value, DecodeError> {
    match object.get(key) {
        Some(Value::Null) | None => Err(DecodeError::MissingRequiredField(field_name(parent, key))),
        Some(value) => Ok(value),
    }
}

fn require_str(
    object: &Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<String, DecodeError> {
    let value = require(object, key, parent)?;
    value
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| invalid(&field_name(parent, key), "expected a string"))
}

fn require_bool(object: &Map<String, Value>, key: &str, parent: &str) -> Result<bool, DecodeError> {
    let value = require(object, key, parent)?;
    value
        .as_bool()
        .ok_or_else(|| invalid(&field_name(parent, key), "expected a boolean"))
}

fn require_u32(object: &Map<String, Value>, key: &str, parent: &str) -> Result<u32, DecodeError> {
    let value = require(object, key, parent)?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(&field_name(parent, key), "expected a non-negative integer"))
}

fn require_i64(object: &Map<String, Value>, key: &str, parent: &str) -> Result<i64, DecodeError> {
    let value = require(object, key, parent)?;
    value
        .as_i64()
        .ok_or_else(|| invalid(&field_name(parent, key), "expected an integer"))
}

fn optional_str(
    object: &Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<String>, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(&field_name(parent, key), "expected a string")),
    }
}

fn optional_i64(
    object: &Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<i64>, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(&field_name(parent, key), "expected an integer")),
    }
}

fn optional_bool(
    object: &Map<String, Value>,
    key: &str,
    parent: &str,
    default: bool,
) -> Result<bool, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(&field_name(parent, key), "expected a boolean")),
    }
}
