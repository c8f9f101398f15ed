// file: src/models/collection.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Calendar,
    AddressBook,
    TaskList,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Calendar => "calendar",
            CollectionKind::AddressBook => "addressBook",
            CollectionKind::TaskList => "taskList",
        }
    }

    pub fn parse(value: &str) -> Option<CollectionKind> {
        match value {
            "calendar" => Some(CollectionKind::Calendar),
            "addressBook" => Some(CollectionKind::AddressBook),
            "taskList" => Some(CollectionKind::TaskList),
            _ => None,
        }
    }
}

/// A calendar, address book or task list belonging to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    pub id: Option<i64>,
    pub account_id: i64,
    pub kind: String,
    pub url: String,
    pub display_name: String,
    pub color: Option<i64>,
    pub sync_enabled: bool,
    pub visible: bool,
    pub wifi_only_sync: bool,
    pub force_read_only: bool,
    /// Calendar-only: events older than this many days are not synced.
    pub skip_events_older_days: Option<i64>,
}

impl Collection {
    pub fn new(account_id: i64, kind: CollectionKind, url: String, display_name: String) -> Self {
        Self {
            id: None,
            account_id,
            kind: kind.as_str().to_string(),
            url,
            display_name,
            color: None,
            sync_enabled: true,
            visible: true,
            wifi_only_sync: false,
            force_read_only: false,
            skip_events_older_days: None,
        }
    }

    pub fn kind(&self) -> Result<CollectionKind, String> {
        CollectionKind::parse(&self.kind)
            .ok_or_else(|| format!("Unknown collection kind: {}", self.kind))
    }
}
