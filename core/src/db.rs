use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};
use tracing::debug;

use crate::store::KeyValueStore;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        debug!(from = version, "database schema up to date");
        Ok(())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context(|| format!("Failed to save '{key}'"))?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_setting(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_setting(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.delete_setting(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            self.set_setting(key, value)?;
        }
        tx.commit().context("Failed to commit settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("plants").unwrap().is_none());

        db.set_setting("plants", "[]").unwrap();
        assert_eq!(db.get_setting("plants").unwrap().as_deref(), Some("[]"));

        db.set_setting("plants", "[1]").unwrap();
        assert_eq!(db.get_setting("plants").unwrap().as_deref(), Some("[1]"));

        assert!(db.delete_setting("plants").unwrap());
        assert!(!db.delete_setting("plants").unwrap());
        assert!(db.get_setting("plants").unwrap().is_none());
    }

    #[test]
    fn test_set_many_is_visible() {
        let db = Database::open_in_memory().unwrap();
        db.set_many(&[
            ("theme", "\"dark\"".to_string()),
            ("palette", "\"ocean\"".to_string()),
        ])
        .unwrap();
        assert_eq!(db.get("theme").unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(db.get("palette").unwrap().as_deref(), Some("\"ocean\""));
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprout.db");
        {
            let db = Database::open(&path).unwrap();
            db.set("global_notes", "mist the fern").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get("global_notes").unwrap().as_deref(),
            Some("mist the fern")
        );
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
