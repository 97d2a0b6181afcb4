use std::sync::Arc;
use anyhow::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use r2d2_sqlite::rusqlite::{params, OpenFlags};

use crate::storage::area::{LocalStore, StorageArea};

/// SQLite-based local storage implementation
pub struct SqliteLocalStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteLocalStore {
    /// Creates a new SQLite local store with the specified database file path.
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE |
                    OpenFlags::SQLITE_OPEN_CREATE |
                    OpenFlags::SQLITE_OPEN_URI
            )
            .with_init(|c| {
                c.busy_timeout(std::time::Duration::from_millis(500))?;
                c.pragma_update(None, "journal_mode", "WAL")?;
                c.execute_batch(
                    "CREATE TABLE IF NOT EXISTS local_storage (
                        origin TEXT NOT NULL,
                        key TEXT NOT NULL,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now')),
                        PRIMARY KEY(origin, key)
                    );"
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(std::time::Duration::from_secs(5))
            .build(manager)?;

        log::debug!("opened sqlite local store at {path}");
        Ok(Self { pool })
    }
}

impl LocalStore for SqliteLocalStore {
    fn area(&self, origin: &url::Origin) -> Result<Arc<dyn StorageArea>> {
        Ok(Arc::new(SqliteLocalArea {
            pool: self.pool.clone(),
            origin: origin.ascii_serialization(),
        }))
    }
}

struct SqliteLocalArea {
    pool: Pool<SqliteConnectionManager>,
    origin: String,
}

impl SqliteLocalArea {
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

impl StorageArea for SqliteLocalArea {
    fn get_item(&self, key: &str) -> Option<String> {
        let conn = self.conn().ok()?;
        conn.query_row(
            "SELECT value FROM local_storage WHERE origin=?1 AND key=?2",
            params![self.origin, key],
            |row| row.get::<_, String>(0),
        ).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO local_storage(origin,key,value) VALUES (?1,?2,?3)
             ON CONFLICT(origin,key) DO UPDATE
             SET value=excluded.value, updated_at=strftime('%s','now')",
            params![self.origin, key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM local_storage WHERE origin=?1 AND key=?2",
            params![self.origin, key],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM local_storage WHERE origin=?1",
            params![self.origin],
        )?;
        Ok(())
    }

    fn len(&self) -> usize {
        let conn = match self.conn() { Ok(c) => c, Err(_) => return 0 };
        conn.query_row::<u32, _, _>(
            "SELECT COUNT(*) FROM local_storage WHERE origin=?1",
            params![self.origin],
            |row| row.get(0),
        ).unwrap_or(0) as usize
    }

    fn keys(&self) -> Vec<String> {
        let conn = match self.conn() { Ok(c) => c, Err(_) => return vec![] };
        let mut stmt = match conn.prepare(
            "SELECT key FROM local_storage WHERE origin=?1 ORDER BY key",
        ) { Ok(s) => s, Err(_) => return vec![] };

        let rows = match stmt.query_map(
            params![self.origin],
            |row| row.get::<_, String>(0),
        ) { Ok(r) => r, Err(_) => return vec![] };

        rows.filter_map(Result::ok).collect()
    }
}
