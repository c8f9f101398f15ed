// file: src/database/accounts.rs
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<crate::models::Account>> {
    let accounts = sqlx::query_as::<_, crate::models::Account>(
        "SELECT id, account_name, server_url, username, credential_ref, certificate_fingerprint \
         FROM accounts ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<crate::models::Account>> {
    let account = sqlx::query_as::<_, crate::models::Account>(
        "SELECT id, account_name, server_url, username, credential_ref, certificate_fingerprint \
         FROM accounts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Insert a new account, or update the existing row when `id` is set.
/// Returns the local id in both cases.
pub async fn upsert(pool: &SqlitePool, account: &crate::models::Account) -> Result<i64> {
    match account.id {
        Some(id) => {
            sqlx::query(
                "UPDATE accounts SET account_name = ?, server_url = ?, username = ?, \
                 credential_ref = ?, certificate_fingerprint = ? WHERE id = ?",
            )
            .bind(&account.account_name)
            .bind(&account.server_url)
            .bind(&account.username)
            .bind(&account.credential_ref)
            .bind(&account.certificate_fingerprint)
            .bind(id)
            .execute(pool)
            .await?;

            Ok(id)
        }
        None => {
            let result = sqlx::query(
                "INSERT INTO accounts (account_name, server_url, username, credential_ref, certificate_fingerprint) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&account.account_name)
            .bind(&account.server_url)
            .bind(&account.username)
            .bind(&account.credential_ref)
            .bind(&account.certificate_fingerprint)
            .execute(pool)
            .await?;

            Ok(result.last_insert_rowid())
        }
    }
}
