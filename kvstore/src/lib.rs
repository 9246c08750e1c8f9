use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const TABLENAME: &str = "kvstore";
const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

#[derive(Error, Debug)]
pub enum KVStoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not (de)serialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// JSON-valued key/value store on top of a single SQLite table
pub struct KVDb {
    conn: Connection,
}

impl KVDb {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        // Create directory for DB if it doesn't already exist
        std::fs::create_dir_all(path.as_ref().parent().unwrap_or(Path::new("")))?;
        let conn = Connection::open(path.as_ref())?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                {KEY_FIELD} TEXT PRIMARY KEY NOT NULL,
                {VALUE_FIELD} BLOB NOT NULL
                )"
            ),
            [],
        )?;
        log::trace!("Opened key/value store at {}", path.as_ref().display());
        Ok(KVDb { conn })
    }

    fn select(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.conn
            .query_row(
                &format!("SELECT {VALUE_FIELD} FROM '{TABLENAME}' WHERE {KEY_FIELD} = ?1"),
                [key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, KVStoreError> {
        self.select(key.as_ref())?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(Into::into)
    }

    /// Store an already-serialized JSON value
    pub fn set_raw(&self, key: &str, value_json: &str) -> Result<(), KVStoreError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT INTO '{TABLENAME}' ({KEY_FIELD}, {VALUE_FIELD}) values (?1, ?2)
            ON CONFLICT({KEY_FIELD}) DO UPDATE SET {VALUE_FIELD}=?2",
        ))?;
        stmt.execute(params![key, value_json.as_bytes()])?;
        log::trace!("Set {key}");
        Ok(())
    }

    pub fn set<K: AsRef<str>, V: Serialize>(&self, key: K, value: V) -> Result<(), KVStoreError> {
        self.set_raw(key.as_ref(), &serde_json::to_string(&value)?)
    }

    /// All keys starting with `prefix`, in ascending order
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KVStoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {KEY_FIELD} FROM '{TABLENAME}'
            WHERE substr({KEY_FIELD}, 1, length(?1)) = ?1 ORDER BY {KEY_FIELD}"
        ))?;
        let keys = stmt
            .query_map([prefix], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() -> Result<(), KVStoreError> {
        let db = KVDb::new(":memory:")?;
        assert_eq!(db.get::<String>("nope")?, None);
        Ok(())
    }

    #[test]
    fn set_overwrites() -> Result<(), KVStoreError> {
        let db = KVDb::new(":memory:")?;
        db.set("k", "first")?;
        db.set("k", "second")?;
        assert_eq!(db.get::<String>("k")?, Some("second".into()));
        Ok(())
    }

    #[test]
    fn prefix_listing() -> Result<(), KVStoreError> {
        let db = KVDb::new(":memory:")?;
        db.set("node/b", 2)?;
        db.set("node/a", 1)?;
        db.set("nodes_total", 2)?;
        db.set("app_config", "x")?;

        assert_eq!(db.keys_with_prefix("node/")?, vec!["node/a", "node/b"]);
        assert!(db.keys_with_prefix("sensor/")?.is_empty());
        Ok(())
    }
}
