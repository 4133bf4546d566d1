//! SQLite-backed analytics store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{AnalyticsStore, TrendingEntry, TrendingError};
use crate::catalog::MovieSummary;

/// SQLite-backed analytics store.
///
/// One row per query text. `update_seq` is a monotonically increasing
/// counter bumped on every write and used to order ties deterministically.
pub struct SqliteAnalyticsStore {
    conn: Mutex<Connection>,
}

impl SqliteAnalyticsStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TrendingError> {
        let conn = Connection::open(path).map_err(|e| TrendingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, TrendingError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TrendingError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TrendingError> {
        conn.execute_batch(
            r#"
            -- Per-query search hits (one row per exact query text)
            CREATE TABLE IF NOT EXISTS trending_searches (
                query TEXT PRIMARY KEY,
                hit_count INTEGER NOT NULL DEFAULT 1,
                representative TEXT NOT NULL,
                first_seen_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                update_seq INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trending_searches_rank
                ON trending_searches(hit_count DESC, update_seq DESC);
            "#,
        )
        .map_err(|e| TrendingError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, TrendingError> {
        self.conn
            .lock()
            .map_err(|_| TrendingError::Database("connection lock poisoned".to_string()))
    }

    fn load_entry(conn: &Connection, query: &str) -> Result<Option<TrendingEntry>, TrendingError> {
        conn.query_row(
            "SELECT query, hit_count, representative, first_seen_at, updated_at
             FROM trending_searches WHERE query = ?",
            params![query],
            Self::row_to_raw,
        )
        .optional()
        .map_err(|e| TrendingError::Database(e.to_string()))?
        .map(RawEntry::into_entry)
        .transpose()
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawEntry> {
        Ok(RawEntry {
            query: row.get(0)?,
            hit_count: row.get(1)?,
            representative: row.get(2)?,
            first_seen_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

/// Row as stored, before the JSON and timestamp columns are decoded.
struct RawEntry {
    query: String,
    hit_count: u32,
    representative: String,
    first_seen_at: String,
    updated_at: String,
}

impl RawEntry {
    fn into_entry(self) -> Result<TrendingEntry, TrendingError> {
        let representative: MovieSummary = serde_json::from_str(&self.representative)
            .map_err(|e| TrendingError::Serialization(e.to_string()))?;

        Ok(TrendingEntry {
            query: self.query,
            hit_count: self.hit_count,
            representative,
            first_seen_at: parse_timestamp(&self.first_seen_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TrendingError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TrendingError::Serialization(format!("invalid timestamp '{}': {}", s, e)))
}

#[async_trait]
impl AnalyticsStore for SqliteAnalyticsStore {
    async fn increment(
        &self,
        query: &str,
        representative: &MovieSummary,
    ) -> Result<TrendingEntry, TrendingError> {
        let representative_json = serde_json::to_string(representative)
            .map_err(|e| TrendingError::Serialization(e.to_string()))?;
        let now_str = Utc::now().to_rfc3339();

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let next_seq: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(update_seq), 0) + 1 FROM trending_searches",
                [],
                |row| row.get(0),
            )
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO trending_searches (query, hit_count, representative, first_seen_at, updated_at, update_seq)
             VALUES (?1, 1, ?2, ?3, ?3, ?4)
             ON CONFLICT(query) DO UPDATE SET
                 hit_count = hit_count + 1,
                 updated_at = excluded.updated_at,
                 update_seq = excluded.update_seq",
            params![query, &representative_json, &now_str, next_seq],
        )
        .map_err(|e| TrendingError::Database(e.to_string()))?;

        let entry = Self::load_entry(&tx, query)?.ok_or_else(|| {
            TrendingError::Database(format!("entry for '{}' missing after upsert", query))
        })?;

        tx.commit()
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        Ok(entry)
    }

    async fn top(&self, limit: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT query, hit_count, representative, first_seen_at, updated_at
                 FROM trending_searches
                 ORDER BY hit_count DESC, update_seq DESC
                 LIMIT ?",
            )
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_raw)
            .map_err(|e| TrendingError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| TrendingError::Database(e.to_string()))?;
            entries.push(raw.into_entry()?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_increment_creates_then_updates() {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        let first = fixtures::movie(268, "Batman");
        let second = fixtures::movie(364, "Batman Returns");

        let entry = store.increment("batman", &first).await.unwrap();
        assert_eq!(entry.hit_count, 1);
        assert_eq!(entry.representative, first);

        let entry = store.increment("batman", &second).await.unwrap();
        assert_eq!(entry.hit_count, 2);
        assert_eq!(entry.representative, first);
        assert!(entry.updated_at >= entry.first_seen_at);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_an_error() {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        store
            .increment("batman", &fixtures::movie(268, "Batman"))
            .await
            .unwrap();

        store
            .lock()
            .unwrap()
            .execute(
                "UPDATE trending_searches SET updated_at = 'yesterday' WHERE query = ?",
                params!["batman"],
            )
            .unwrap();

        let result = store.top(5).await;
        assert!(matches!(result, Err(TrendingError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_query_match_is_case_sensitive() {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        let movie = fixtures::movie(1, "Alien");

        store.increment("alien", &movie).await.unwrap();
        let entry = store.increment("ALIEN", &movie).await.unwrap();
        assert_eq!(entry.hit_count, 1);
        assert_eq!(store.top(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_orders_by_count_then_recency() {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        let movie = fixtures::movie(1, "x");

        store.increment("old-tie", &movie).await.unwrap();
        store.increment("leader", &movie).await.unwrap();
        store.increment("leader", &movie).await.unwrap();
        store.increment("leader", &movie).await.unwrap();
        store.increment("new-tie", &movie).await.unwrap();
        store.increment("single", &movie).await.unwrap();
        store.increment("old-tie", &movie).await.unwrap();
        store.increment("new-tie", &movie).await.unwrap();

        let top = store.top(10).await.unwrap();
        let queries: Vec<_> = top.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["leader", "new-tie", "old-tie", "single"]);
    }

    #[tokio::test]
    async fn test_top_respects_limit() {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        for i in 0..8 {
            store
                .increment(&format!("q{}", i), &fixtures::movie(i, "m"))
                .await
                .unwrap();
        }
        assert_eq!(store.top(5).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trending.db");

        {
            let store = SqliteAnalyticsStore::new(&path).unwrap();
            store
                .increment("dune", &fixtures::movie(438631, "Dune"))
                .await
                .unwrap();
        }

        let store = SqliteAnalyticsStore::new(&path).unwrap();
        let entry = store
            .increment("dune", &fixtures::movie(1, "Other"))
            .await
            .unwrap();
        assert_eq!(entry.hit_count, 2);
        assert_eq!(entry.representative.id, 438631);
    }
}
