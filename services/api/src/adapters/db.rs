//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `KeyValueStore` port from the `core` crate. It keeps each JSON snapshot
//! as one row of a SQLite table, using `sqlx`.

use async_trait::async_trait;
use portal_core::ports::{KeyValueStore, PortError, PortResult};
use sqlx::{FromRow, SqlitePool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `KeyValueStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct EntryRecord {
    value: String,
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, EntryRecord>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(|r| r.value))
    }

    async fn put(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn adapter() -> DbAdapter {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let adapter = DbAdapter::new(pool);
        adapter.run_migrations().await.unwrap();
        adapter
    }

    #[tokio::test]
    async fn put_overwrites_and_remove_clears() {
        let db = adapter().await;
        assert_eq!(db.get("assignments").await.unwrap(), None);

        db.put("assignments", "[1]").await.unwrap();
        db.put("assignments", "[1,2]").await.unwrap();
        assert_eq!(db.get("assignments").await.unwrap().as_deref(), Some("[1,2]"));

        db.remove("assignments").await.unwrap();
        assert_eq!(db.get("assignments").await.unwrap(), None);
    }
}
