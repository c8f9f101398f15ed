// Storage seams consumed by the backup core.
//
// The engine never talks to sqlx directly; it goes through these traits so
// the presentation shell can hand in the real `Database` while tests hand in
// an in-memory store.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Account, AppSettings, Collection};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Account>>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Account>>;
    /// Insert or update, returning the local id.
    async fn upsert(&self, account: &Account) -> Result<i64>;
}

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn get_for_account(&self, account_id: i64) -> Result<Vec<Collection>>;
    /// Insert or update keyed on (account_id, url), returning the local id.
    async fn upsert(&self, collection: &Collection) -> Result<i64>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn read(&self) -> Result<AppSettings>;
    async fn write(&self, settings: &AppSettings) -> Result<()>;
}

// Shells typically hold one shared store behind an Arc; let it satisfy the
// seams directly.

#[async_trait]
impl<T: AccountRepository + ?Sized> AccountRepository for std::sync::Arc<T> {
    async fn get_all(&self) -> Result<Vec<Account>> {
        T::get_all(self).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        T::get_by_id(self, id).await
    }

    async fn upsert(&self, account: &Account) -> Result<i64> {
        T::upsert(self, account).await
    }
}

#[async_trait]
impl<T: CollectionRepository + ?Sized> CollectionRepository for std::sync::Arc<T> {
    async fn get_for_account(&self, account_id: i64) -> Result<Vec<Collection>> {
        T::get_for_account(self, account_id).await
    }

    async fn upsert(&self, collection: &Collection) -> Result<i64> {
        T::upsert(self, collection).await
    }
}

#[async_trait]
impl<T: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<T> {
    async fn read(&self) -> Result<AppSettings> {
        T::read(self).await
    }

    async fn write(&self, settings: &AppSettings) -> Result<()> {
        T::write(self, settings).await
    }
}
