// file: src/database/collections.rs
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get_for_account(
    pool: &SqlitePool,
    account_id: i64,
) -> Result<Vec<crate::models::Collection>> {
    let collections = sqlx::query_as::<_, crate::models::Collection>(
        "SELECT id, account_id, kind, url, display_name, color, sync_enabled, visible, \
         wifi_only_sync, force_read_only, skip_events_older_days \
         FROM collections WHERE account_id = ? ORDER BY id",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(collections)
}

/// Insert or update a collection. Collections are unique per (account_id, url),
/// so an existing row with the same URL is updated regardless of `id`.
pub async fn upsert(pool: &SqlitePool, collection: &crate::models::Collection) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM collections WHERE account_id = ? AND url = ?")
            .bind(collection.account_id)
            .bind(&collection.url)
            .fetch_optional(pool)
            .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE collections SET kind = ?, display_name = ?, color = ?, sync_enabled = ?, \
                 visible = ?, wifi_only_sync = ?, force_read_only = ?, skip_events_older_days = ? \
                 WHERE id = ?",
            )
            .bind(&collection.kind)
            .bind(&collection.display_name)
            .bind(collection.color)
            .bind(collection.sync_enabled)
            .bind(collection.visible)
            .bind(collection.wifi_only_sync)
            .bind(collection.force_read_only)
            .bind(collection.skip_events_older_days)
            .bind(id)
            .execute(pool)
            .await?;

            Ok(id)
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO collections (account_id, kind, url, display_name, color, sync_enabled, \
                 visible, wifi_only_sync, force_read_only, skip_events_older_days) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(collection.account_id)
            .bind(&collection.kind)
            .bind(&collection.url)
            .bind(&collection.display_name)
            .bind(collection.color)
            .bind(collection.sync_enabled)
            .bind(collection.visible)
            .bind(collection.wifi_only_sync)
            .bind(collection.force_read_only)
            .bind(collection.skip_events_older_days)
            .execute(pool)
            .await?;

            Ok(result.last_insert_rowid())
        }
    }
}
