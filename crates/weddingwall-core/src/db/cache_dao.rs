//! Cache entry data access

use rusqlite::params;

use crate::utils::error::{AppError, AppResult};

use super::connection::Database;

/// One stored cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub cache_key: String,
    pub payload: String,
    pub updated_at: String,
}

impl Database {
    /// Read a cache entry.
    pub fn get_cache_entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        let conn = self.connection()?;

        let result = conn.query_row(
            "SELECT cache_key, payload, updated_at FROM cache_entries WHERE cache_key = ?1",
            params![key],
            |row| {
                Ok(CacheEntry {
                    cache_key: row.get(0)?,
                    payload: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Insert or overwrite a cache entry.
    pub fn put_cache_entry(&self, key: &str, payload: &str) -> AppResult<()> {
        let conn = self.connection()?;
        let now = chrono::Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO cache_entries (cache_key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = ?2,
                updated_at = ?3
            "#,
            params![key, payload, now],
        )?;

        Ok(())
    }

    /// Delete a cache entry. Returns whether it existed.
    pub fn delete_cache_entry(&self, key: &str) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute("DELETE FROM cache_entries WHERE cache_key = ?1", params![key])?;
        Ok(rows > 0)
    }
}
