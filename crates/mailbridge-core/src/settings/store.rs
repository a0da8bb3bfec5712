//! Persisted settings storage.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::model::{PartialSettings, Settings};
use crate::Result;

/// Logical key under which the settings record is stored.
const SETTINGS_KEY: &str = "config";

/// Key-value store holding the persisted settings record.
///
/// The record is absent until the first write and only ever overwritten
/// whole after that.
pub trait SettingsStore {
    /// Loads the persisted record, if one was ever written.
    fn load(&self) -> impl Future<Output = Result<Option<PartialSettings>>> + Send;

    /// Overwrites the persisted record.
    fn save(&self, settings: &Settings) -> impl Future<Output = Result<()>> + Send;
}

/// SQLite-backed settings store.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl SettingsStore for SqliteSettingsStore {
    async fn load(&self) -> Result<Option<PartialSettings>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let value: String = row.get("value");
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_string(settings)?;

        sqlx::query(
            r"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(SETTINGS_KEY)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_before_first_write_is_absent() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_record() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        let settings = Settings {
            enabled: true,
            api_key: "xkeysib-12345678".to_string(),
            default_from: "noreply@example.com".to_string(),
            default_from_name: "Example".to_string(),
            default_reply_to: String::new(),
        };
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.into_settings(), settings);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_record() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        let mut settings = Settings {
            enabled: true,
            api_key: "xkeysib-first".to_string(),
            default_from: "noreply@example.com".to_string(),
            ..Default::default()
        };
        store.save(&settings).await.unwrap();

        settings.api_key = "xkeysib-second".to_string();
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("xkeysib-second"));
    }

    #[tokio::test]
    async fn test_corrupt_record_surfaces_as_error() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        sqlx::query("INSERT INTO settings (key, value) VALUES ('config', 'not json')")
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(store.load().await.is_err());
    }
}
