// file: src/models/settings.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// App-wide toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub auto_sync: bool,
    pub wifi_only_sync: bool,
    pub dark_mode: bool,
    pub debug_logging: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_sync: true,
            wifi_only_sync: false,
            dark_mode: true,
            debug_logging: false,
        }
    }
}
