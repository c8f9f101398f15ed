// Account backup & restore core.
//
// A backup run is builder -> codec; a restore run is codec -> planner ->
// executor. `BackupRestoreManager` is the only surface the shell talks to.

pub mod builder;
pub mod codec;
pub mod document;
pub mod executor;
pub mod manager;
pub mod planner;
pub mod repository;

pub use builder::{BackupScope, SnapshotBuilder};
pub use codec::DecodeError;
pub use document::{
    AccountSnapshot, BackupDocument, CollectionSnapshot, SettingsSnapshot, SCHEMA_VERSION,
};
pub use executor::{PerAccountError, RestoreExecutor, RestoreSummary};
pub use manager::{BackupResult, BackupRestoreManager, RestoreResult};
pub use planner::{AccountAction, CollectionAction, LocalAccount, RestorePlan};
pub use repository::{AccountRepository, CollectionRepository, SettingsStore};
