// file: src/database.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Row, Sqlite};

use crate::backup::repository::{AccountRepository, CollectionRepository, SettingsStore};
use crate::models::{Account, AppSettings, Collection};

// Declare submodules
pub mod accounts;
pub mod collections;
pub mod settings;

const DEFAULT_DB_URL: &str = "sqlite:opendav.db?mode=rwc";

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new() -> Result<Self> {
        Self::new_with_url(DEFAULT_DB_URL).await
    }

    pub async fn new_with_url(db_url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        let db_exists = Sqlite::database_exists(db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating database");
            Sqlite::create_database(db_url)
                .await
                .context("Failed to create database")?;
        }

        // Connect to database
        let pool = SqlitePool::connect(db_url)
            .await
            .context("Failed to connect to database")?;

        // Run schema migrations
        run_schema(&pool).await.context("Failed to run database schema")?;

        // Ensure specific migrations for existing databases
        ensure_migrations(&pool).await.context("Failed to ensure migrations")?;

        info!("Database initialized successfully");

        Ok(Database { pool })
    }

    // --- Account Delegates ---

    pub async fn get_accounts(&self) -> Result<Vec<Account>> {
        accounts::get_all(&self.pool).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        accounts::get_by_id(&self.pool, id).await
    }

    pub async fn upsert_account(&self, account: &Account) -> Result<i64> {
        accounts::upsert(&self.pool, account).await
    }

    // --- Collection Delegates ---

    pub async fn get_collections(&self, account_id: i64) -> Result<Vec<Collection>> {
        collections::get_for_account(&self.pool, account_id).await
    }

    pub async fn upsert_collection(&self, collection: &Collection) -> Result<i64> {
        collections::upsert(&self.pool, collection).await
    }

    // --- Settings Delegates ---

    pub async fn get_settings(&self) -> Result<AppSettings> {
        settings::get(&self.pool).await
    }

    pub async fn update_settings(&self, settings: &AppSettings) -> Result<()> {
        settings::update(&self.pool, settings).await
    }
}

#[async_trait]
impl AccountRepository for Database {
    async fn get_all(&self) -> Result<Vec<Account>> {
        accounts::get_all(&self.pool).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        accounts::get_by_id(&self.pool, id).await
    }

    async fn upsert(&self, account: &Account) -> Result<i64> {
        accounts::upsert(&self.pool, account).await
    }
}

#[async_trait]
impl CollectionRepository for Database {
    async fn get_for_account(&self, account_id: i64) -> Result<Vec<Collection>> {
        collections::get_for_account(&self.pool, account_id).await
    }

    async fn upsert(&self, collection: &Collection) -> Result<i64> {
        collections::upsert(&self.pool, collection).await
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn read(&self) -> Result<AppSettings> {
        settings::get(&self.pool).await
    }

    async fn write(&self, settings: &AppSettings) -> Result<()> {
        settings::update(&self.pool, settings).await
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();

    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            sqlx::query(&current_statement).execute(pool).await?;
            current_statement.clear();
        }
    }
    Ok(())
}

async fn ensure_migrations(pool: &SqlitePool) -> Result<()> {
    // Check columns in accounts table
    let rows = sqlx::query("PRAGMA table_info(accounts)")
        .fetch_all(pool)
        .await
        .context("Failed to fetch table info")?;

    let columns: Vec<String> = rows
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

    if !columns.contains(&"certificate_fingerprint".to_string()) {
        info!("Migrating: Adding certificate_fingerprint column to accounts table");
        sqlx::query("ALTER TABLE accounts ADD COLUMN certificate_fingerprint TEXT")
            .execute(pool)
            .await
            .context("Failed to add certificate_fingerprint column")?;
    }

    // Check columns in collections table
    let rows = sqlx::query("PRAGMA table_info(collections)")
        .fetch_all(pool)
        .await
        .context("Failed to fetch table info")?;

    let columns: Vec<String> = rows
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

    if !columns.contains(&"skip_events_older_days".to_string()) {
        info!("Migrating: Adding skip_events_older_days column to collections table");
        sqlx::query("ALTER TABLE collections ADD COLUMN skip_events_older_days INTEGER")
            .execute(pool)
            .await
            .context("Failed to add skip_events_older_days column")?;
    }

    if !columns.contains(&"wifi_only_sync".to_string()) {
        info!("Migrating: Adding wifi_only_sync column to collections table");
        sqlx::query("ALTER TABLE collections ADD COLUMN wifi_only_sync BOOLEAN NOT NULL DEFAULT 0")
            .execute(pool)
            .await
            .context("Failed to add wifi_only_sync column")?;
    }

    Ok(())
}
