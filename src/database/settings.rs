// file: src/database/settings.rs
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool) -> Result<crate::models::AppSettings> {
    let settings = sqlx::query_as::<_, crate::models::Setting>("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    // Convert to AppSettings, tolerating missing or garbled rows
    let mut app_settings = crate::models::AppSettings::default();
    for setting in settings {
        match setting.key.as_str() {
            "auto_sync" => app_settings.auto_sync = setting.value.parse().unwrap_or(true),
            "wifi_only_sync" => {
                app_settings.wifi_only_sync = setting.value.parse().unwrap_or(false)
            }
            "dark_mode" => app_settings.dark_mode = setting.value.parse().unwrap_or(true),
            "debug_logging" => app_settings.debug_logging = setting.value.parse().unwrap_or(false),
            _ => {}
        }
    }

    Ok(app_settings)
}

pub async fn update(pool: &SqlitePool, settings: &crate::models::AppSettings) -> Result<()> {
    let updates = vec![
        ("auto_sync", settings.auto_sync.to_string()),
        ("wifi_only_sync", settings.wifi_only_sync.to_string()),
        ("dark_mode", settings.dark_mode.to_string()),
        ("debug_logging", settings.debug_logging.to_string()),
    ];

    for (key, value) in updates {
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}
