// src/index/sqlite.rs

//! Metadata index backed by the local SQLite database

use super::{IndexEntry, MetadataIndex};
use crate::db::{self, models::PkgMeta};
use crate::error::{Error, Result};
use rusqlite::Connection;
use std::sync::Mutex;
use tracing::debug;

/// Index reading `pkgmeta` rows
///
/// The connection sits behind a mutex so that one index can serve every
/// worker of a parallel batch.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    db_path: String,
}

impl SqliteIndex {
    /// Open a database previously built with `build-db`
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = db::open_existing(db_path)?;
        debug!("Opened metadata database {}", db_path);
        Ok(Self::from_connection(conn, db_path))
    }

    /// Wrap an already opened connection
    pub fn from_connection(conn: Connection, db_path: &str) -> Self {
        Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_string(),
        }
    }
}

impl MetadataIndex for SqliteIndex {
    fn get(&self, name: &str) -> Result<Option<IndexEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::InitError("metadata database lock poisoned".to_string()))?;
        Ok(PkgMeta::find_by_name(&conn, name)?.map(|meta| meta.to_entry()))
    }

    fn describe(&self) -> String {
        format!("metadata database {}", self.db_path)
    }
}
