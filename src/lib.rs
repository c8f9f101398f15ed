// OpenDAV core library
// Configuration backup & restore for the OpenDAV calendar/contact/task sync
// client. The sync engine, credential storage and all UI live in the shell;
// this crate owns the local configuration store and the portable snapshot
// format.

pub mod backup;
pub mod database;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use backup::{
    AccountRepository, BackupDocument, BackupRestoreManager, BackupResult, BackupScope,
    CollectionRepository, DecodeError, PerAccountError, RestoreResult, RestoreSummary,
    SettingsStore, SCHEMA_VERSION,
};
pub use database::Database;
pub use error::{AppError, AppResult};
pub use models::*;
