//! Access to the Nextcloud database.
//!
//! [`NextcloudDb`] serves two roles during setup: it is the app config store
//! the push server reads the cookie from, and it is the metadata store the
//! mapping check derives its expected value from.

use std::path::Path;

use md5::{Digest, Md5};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;

use crate::app_config::AppConfigStore;
use crate::error::StoreError;

/// A `(storage_id, count)` pair computed from the mount tables.
///
/// Only valid within the run that computed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingFact {
    /// Numeric storage id of a mounted storage.
    pub storage_id: i64,
    /// Number of mounts of that storage whose root is the storage root.
    pub count: i64,
}

/// Source of the fact the mapping check validates against.
pub trait MappingSource: std::fmt::Debug {
    /// Returns the mount count of one storage whose root entry has the
    /// empty path, or `None` when no such storage exists.
    fn storage_mapping_for_test(&self) -> Result<Option<MappingFact>, StoreError>;
}

/// `md5("")` in hex, the `path_hash` of every storage root in `filecache`.
pub fn empty_path_hash() -> String {
    format!("{:x}", Md5::digest(b""))
}

/// Handle on a Nextcloud SQLite database.
#[derive(Debug)]
pub struct NextcloudDb {
    conn: Connection,
    prefix: String,
}

impl NextcloudDb {
    /// Opens the existing database at `path` using the given table prefix.
    pub fn open(path: &Path, prefix: &str) -> anyhow::Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Self::with_connection(conn, prefix)
    }

    /// Creates (or opens) the database at `path` and ensures the tables
    /// setup touches exist.
    pub fn create(path: &Path, prefix: &str) -> anyhow::Result<Self> {
        let db = Self::with_connection(Connection::open(path)?, prefix)?;
        db.create_schema()?;
        Ok(db)
    }

    /// Opens a fresh in-memory database.
    pub fn in_memory(prefix: &str) -> anyhow::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, prefix)
    }

    fn with_connection(conn: Connection, prefix: &str) -> anyhow::Result<Self> {
        // The prefix is spliced into SQL, so only identifier characters pass.
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            anyhow::bail!("invalid table prefix '{}'", prefix);
        }
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    /// Table prefix in use.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Creates the subset of the Nextcloud schema setup touches, if missing.
    pub fn create_schema(&self) -> Result<(), StoreError> {
        let p = &self.prefix;
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {p}appconfig (
                appid TEXT NOT NULL,
                configkey TEXT NOT NULL,
                configvalue TEXT,
                PRIMARY KEY (appid, configkey)
            );
            CREATE TABLE IF NOT EXISTS {p}mounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                storage_id INTEGER NOT NULL,
                root_id INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                mount_point TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS {p}filecache (
                fileid INTEGER PRIMARY KEY AUTOINCREMENT,
                storage INTEGER NOT NULL,
                path TEXT,
                path_hash TEXT NOT NULL
            );"
        ))?;
        Ok(())
    }

    /// Inserts a `filecache` row and returns its file id.
    pub fn insert_file(&self, storage: i64, path: &str) -> Result<i64, StoreError> {
        let path_hash = format!("{:x}", Md5::digest(path.as_bytes()));
        self.conn.execute(
            &format!(
                "INSERT INTO {}filecache (storage, path, path_hash) VALUES (?1, ?2, ?3)",
                self.prefix
            ),
            params![storage, path, path_hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Inserts a `mounts` row.
    pub fn insert_mount(
        &self,
        storage_id: i64,
        root_id: i64,
        user_id: &str,
        mount_point: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {}mounts (storage_id, root_id, user_id, mount_point)
                 VALUES (?1, ?2, ?3, ?4)",
                self.prefix
            ),
            params![storage_id, root_id, user_id, mount_point],
        )?;
        Ok(())
    }
}

impl MappingSource for NextcloudDb {
    fn storage_mapping_for_test(&self) -> Result<Option<MappingFact>, StoreError> {
        let p = &self.prefix;
        let sql = format!(
            "SELECT m.storage_id, COUNT(*) FROM {p}mounts m
             INNER JOIN {p}filecache f ON m.root_id = f.fileid
             WHERE f.path_hash = ?1
             GROUP BY m.storage_id
             LIMIT 1"
        );
        let fact = self
            .conn
            .query_row(&sql, params![empty_path_hash()], |row| {
                Ok(MappingFact {
                    storage_id: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .optional()?;
        log::debug!("Storage mapping for test: {:?}", fact);
        Ok(fact)
    }
}

impl AppConfigStore for NextcloudDb {
    fn set_value(&self, app: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {}appconfig (appid, configkey, configvalue) VALUES (?1, ?2, ?3)
                 ON CONFLICT (appid, configkey) DO UPDATE SET configvalue = excluded.configvalue",
                self.prefix
            ),
            params![app, key, value],
        )?;
        Ok(())
    }

    fn get_value(&self, app: &str, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                &format!(
                    "SELECT configvalue FROM {}appconfig WHERE appid = ?1 AND configkey = ?2",
                    self.prefix
                ),
                params![app, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
